//! Password reset & change routes

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    grants::{error::message_code, reset},
    setups::ServerSetup,
};
use axum::{self, extract::State, http::StatusCode, Json};
use doorman_core::common::{MessageResponse, PasswordChangeRequest, PasswordResetRequest};

/// POST handler initiating a password reset: issues a temporary
/// credential and delivers it to the account email
#[utoipa::path(
    post,
    path = "/user/password",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Password reset initiated", body = MessageResponse),
        (status = 400, description = "Missing email", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    )
)]
pub async fn post_password_reset<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Json(request): Json<PasswordResetRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    reset::initiate(&state, &request.email).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::with_code(
            "Password reset initiated",
            message_code::PASSWORD_RESET_INITIATED,
        )),
    ))
}

/// PUT handler changing the password of an active user
#[utoipa::path(
    put,
    path = "/user/password",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing fields / policy / mismatch", body = AppError),
        (status = 401, description = "Old password incorrect", body = AppError),
        (status = 403, description = "User has no active grant", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    )
)]
pub async fn put_password<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Json(request): Json<PasswordChangeRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    reset::confirm(&state, request).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::with_code(
            "Password updated successfully",
            message_code::PASSWORD_UPDATED_SUCCESSFULLY,
        )),
    ))
}
