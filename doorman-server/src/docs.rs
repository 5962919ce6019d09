//! OpenAPI documentation.

use crate::{
    error::AppError,
    routes::{health, password, ping, user, verification},
};
use axum::Json;
use doorman_core::{
    common::{
        EnrollmentRequest, GrantPatchRequest, GrantSpec, GrantView, MessageResponse,
        PasswordChangeRequest, PasswordResetRequest, UserProfile, UsersResponse,
        VerificationRequest,
    },
    identifier::{AppId, RoleId},
    status::GrantStatus,
};
use utoipa::OpenApi;

/// OpenAPI doc for the doorman server API
#[derive(OpenApi)]
#[openapi(
    paths(
        user::post_enrollment,
        user::list_users,
        user::get_user,
        user::patch_user,
        user::delete_user,
        verification::put_verification,
        password::post_password_reset,
        password::put_password,
        health::healthcheck,
        ping::get,
    ),
    components(schemas(
        AppError,
        AppId,
        EnrollmentRequest,
        GrantPatchRequest,
        GrantSpec,
        GrantStatus,
        GrantView,
        MessageResponse,
        PasswordChangeRequest,
        PasswordResetRequest,
        RoleId,
        UserProfile,
        UsersResponse,
        VerificationRequest,
        health::HealthcheckResponse,
    ))
)]
pub struct ApiDoc;

/// GET handler serving the OpenAPI document
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
