//! Verification-code submission route

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    grants::{error::message_code, verification},
    setups::ServerSetup,
};
use axum::{self, extract::State, http::StatusCode, Json};
use doorman_core::common::{MessageResponse, VerificationRequest};

/// PUT handler validating a submitted one-time code against the user's
/// pending grants
#[utoipa::path(
    put,
    path = "/user/verification",
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Grant verified and activated", body = MessageResponse),
        (status = 401, description = "Invalid or expired verification code", body = AppError),
        (status = 404, description = "User not found", body = AppError),
    )
)]
pub async fn put_verification<S: ServerSetup>(
    State(state): State<AppState<S>>,
    Json(request): Json<VerificationRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    verification::verify(&state, &request.user_email, &request.verification_code).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::with_code(
            "User successfully verified",
            message_code::VERIFICATION_SUCCESSFUL,
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorResponse,
        grants::codes,
        store::UserStore,
        test_utils::{route_builder::RouteBuilder, test_context::TestContext},
    };
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use http::Method;
    use serde_json::json;
    use testresult::TestResult;

    async fn enroll(ctx: &TestContext) -> TestResult<String> {
        ctx.registry().add_role("admin");
        ctx.registry().add_app("billing");

        RouteBuilder::new(ctx.app(), Method::POST, "/user/enrollment")
            .with_json_body(json!({
                "name": "Ada",
                "email": "ada@x.com",
                "password": "Str0ng!Pass",
                "role_name": "admin",
                "app_name": "billing",
            }))?
            .into_json_response::<MessageResponse>()
            .await?;

        let (_, code) = ctx
            .verification_code_sender()
            .get_emails()
            .into_iter()
            .last()
            .expect("No email sent");
        Ok(code)
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_ok() -> TestResult {
        let ctx = TestContext::new().await;
        let code = enroll(&ctx).await?;

        let (status, body) = RouteBuilder::new(ctx.app(), Method::PUT, "/user/verification")
            .with_json_body(json!({ "user_email": "ada@x.com", "verification_code": code }))?
            .into_json_response::<MessageResponse>()
            .await?;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.code.as_deref(),
            Some(message_code::VERIFICATION_SUCCESSFUL)
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_wrong_code_unauthorized() -> TestResult {
        let ctx = TestContext::new().await;
        enroll(&ctx).await?;

        let (status, body) = RouteBuilder::new(ctx.app(), Method::PUT, "/user/verification")
            .with_json_body(json!({ "user_email": "ada@x.com", "verification_code": "000000" }))?
            .into_json_response::<ErrorResponse>()
            .await?;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_matches!(
            body.errors.as_slice(),
            [AppError {
                status: StatusCode::UNAUTHORIZED,
                ..
            }]
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_expired_code_unauthorized() -> TestResult {
        let ctx = TestContext::new().await;
        let code = enroll(&ctx).await?;

        let mut user = ctx.store().find_by_email("ada@x.com").await?.unwrap();
        user.apps[0].code_expiration = codes::expiry_timestamp(Utc::now() - Duration::hours(1));
        ctx.store().replace_grants("ada@x.com", &user.apps).await?;

        let (status, _) = RouteBuilder::new(ctx.app(), Method::PUT, "/user/verification")
            .with_json_body(json!({ "user_email": "ada@x.com", "verification_code": code }))?
            .into_json_response::<ErrorResponse>()
            .await?;

        assert_eq!(status, StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_unknown_user_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let (status, _) = RouteBuilder::new(ctx.app(), Method::PUT, "/user/verification")
            .with_json_body(json!({ "user_email": "ghost@x.com", "verification_code": "1" }))?
            .into_json_response::<ErrorResponse>()
            .await?;

        assert_eq!(status, StatusCode::NOT_FOUND);

        Ok(())
    }
}
