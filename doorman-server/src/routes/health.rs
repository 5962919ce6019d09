//! Healthcheck route.

use crate::{app_state::AppState, error::AppResult, setups::ServerSetup, store::UserStore};
use axum::{self, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A healthcheck response containing diagnostic information for the service
#[derive(ToSchema, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct HealthcheckResponse {
    store_connected: bool,
}

impl HealthcheckResponse {
    /// Whether the service is healthy
    pub fn is_healthy(&self) -> bool {
        self.store_connected
    }

    /// The status code for the healthcheck response
    pub fn status_code(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET handler for checking service health.
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "doorman-server healthy", body=HealthcheckResponse),
        (status = 503, description = "doorman-server not healthy", body=HealthcheckResponse)
    )
)]
pub async fn healthcheck<S: ServerSetup>(
    State(state): State<AppState<S>>,
) -> AppResult<(StatusCode, axum::Json<HealthcheckResponse>)> {
    let response = HealthcheckResponse {
        store_connected: state.store.ping().await.is_ok(),
    };

    Ok((response.status_code(), axum::Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{route_builder::RouteBuilder, test_context::TestContext};
    use http::Method;
    use testresult::TestResult;

    #[test_log::test(tokio::test)]
    async fn test_healthcheck_ok() -> TestResult {
        let ctx = TestContext::new().await;

        let (status, body) = RouteBuilder::new(ctx.app(), Method::GET, "/healthcheck")
            .into_json_response::<HealthcheckResponse>()
            .await?;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_healthy());

        Ok(())
    }
}
