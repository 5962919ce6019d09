//! User enrollment & grant management routes

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    grants::{
        enrollment::{self, EnrollmentOutcome},
        error::{message_code, FlowError},
        mutation, resolver,
    },
    models::user::{User, UserId},
    setups::ServerSetup,
    store::UserStore,
};
use axum::{
    self,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use doorman_core::common::{
    EnrollmentRequest, GrantPatchRequest, MessageResponse, UserProfile, UsersResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

/// POST handler for enrolling a user into one or more role/app grants
#[utoipa::path(
    post,
    path = "/user/enrollment",
    request_body = EnrollmentRequest,
    responses(
        (status = 201, description = "User created, verification code(s) sent", body = MessageResponse),
        (status = 200, description = "Existing user updated with new grant(s)", body = MessageResponse),
        (status = 400, description = "Bad request", body = AppError),
        (status = 404, description = "Application not found", body = AppError),
        (status = 409, description = "Duplicate role/app assignment", body = AppError),
        (status = 422, description = "Validation failed", body = AppError),
    )
)]
pub async fn post_enrollment<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Json(request): Json<EnrollmentRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    match enrollment::enroll(&state, request).await? {
        EnrollmentOutcome::Created => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::with_code(
                "User created successfully and verification code(s) sent.",
                message_code::CREATED,
            )),
        )),
        EnrollmentOutcome::Updated => Ok((
            StatusCode::OK,
            Json(MessageResponse::with_code(
                "User updated with new role(s) and app(s). Verification code(s) sent.",
                message_code::CREATED,
            )),
        )),
    }
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Restrict to users holding a grant for this application (ID or name)
    pub app_id: Option<String>,
}

/// GET handler for listing users, optionally filtered by application
#[utoipa::path(
    get,
    path = "/user",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = UsersResponse),
        (status = 404, description = "Application not found", body = AppError),
    )
)]
pub async fn list_users<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<(StatusCode, Json<UsersResponse>)> {
    let app = match query.app_id.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(reference) => Some(resolver::resolve_app(&state.registry, reference).await?),
        None => None,
    };

    let users = state.store.list(app.as_ref()).await.map_err(FlowError::from)?;

    Ok((
        StatusCode::OK,
        Json(UsersResponse {
            users: users.iter().map(User::to_profile).collect(),
        }),
    ))
}

/// GET handler for fetching a single user
#[utoipa::path(
    get,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found user", body = UserProfile),
        (status = 400, description = "Malformed user ID", body = AppError),
        (status = 404, description = "Not found", body = AppError),
    )
)]
pub async fn get_user<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let id = parse_user_id(&id)?;

    let user = state
        .store
        .find_by_id(&id)
        .await
        .map_err(FlowError::from)?
        .ok_or(FlowError::UserNotFound)?;

    Ok((StatusCode::OK, Json(user.to_profile())))
}

/// PATCH handler updating a single grant of the user, addressed by app
#[utoipa::path(
    patch,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = GrantPatchRequest,
    responses(
        (status = 200, description = "Grant updated", body = UserProfile),
        (status = 400, description = "Bad request", body = AppError),
        (status = 404, description = "User or app assignment not found", body = AppError),
        (status = 422, description = "Invalid role or status", body = AppError),
    )
)]
pub async fn patch_user<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(request): Json<GrantPatchRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let id = parse_user_id(&id)?;

    let user = mutation::patch_grant(&state, &id, request).await?;

    Ok((StatusCode::OK, Json(user.to_profile())))
}

/// DELETE handler revoking every grant of the user.
///
/// Deletion is revocation: the user record stays, all grants go
/// `Inactive` with their sessions closed.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "All accesses inactivated", body = UserProfile),
        (status = 400, description = "Malformed user ID", body = AppError),
        (status = 404, description = "Not found", body = AppError),
    )
)]
pub async fn delete_user<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let id = parse_user_id(&id)?;

    let user = mutation::revoke_all(&state, &id).await?;

    Ok((StatusCode::OK, Json(user.to_profile())))
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    raw.parse()
        .map_err(|_| AppError::new(StatusCode::BAD_REQUEST, Some("Invalid user id")))
}
