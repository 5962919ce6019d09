//! Generic result/error resprentation(s).

use crate::grants::error::FlowError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard return type out of routes / handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Encodes [JSONAPI error object responses](https://jsonapi.org/examples/#error-objects).
///
/// JSONAPI error object -  ALL Fields are technically optional.
///
/// This struct uses the following guidelines:
///
/// 1. Always encode the StatusCode of the response
/// 2. Set the title to the `canonical_reason` of the status code.
///    According to spec, this should NOT change over time.
/// 3. For unrecoverable errors, encode the detail as the to_string of the error
/// 4. Carry the stable `message_code` for domain errors existing clients
///    match on (`INVALID_NAME`, `USER_ALREADY_REGISTERED`, ...)
#[derive(ToSchema, thiserror::Error, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct AppError {
    #[schema(value_type = u16, example = 404)]
    #[serde(with = "crate::error::serde_status_code")]
    pub(crate) status: StatusCode,
    #[schema(example = "Not Found")]
    pub(crate) title: Option<String>,
    #[schema(example = "User not found")]
    pub(crate) detail: Option<String>,
    #[schema(example = "USER_NOT_FOUND")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<String>,
}

impl AppError {
    /// New instance of [AppError].
    pub fn new<M: ToString>(status_code: StatusCode, message: Option<M>) -> AppError {
        Self {
            status: status_code,
            title: Self::canonical_reason_to_string(&status_code),
            detail: message.map(|m| m.to_string()),
            code: None,
        }
    }

    /// New instance of [AppError] with a stable message code.
    pub fn with_code<M: ToString>(
        status_code: StatusCode,
        message: Option<M>,
        code: &'static str,
    ) -> AppError {
        Self {
            code: Some(code.to_string()),
            ..Self::new(status_code, message)
        }
    }

    fn canonical_reason_to_string(status_code: &StatusCode) -> Option<String> {
        status_code.canonical_reason().map(|r| r.to_string())
    }
}

#[derive(Debug, Deserialize, Serialize)]
/// Error in JSON API response format.
pub struct ErrorResponse {
    pub(crate) errors: Vec<AppError>,
}

impl From<AppError> for ErrorResponse {
    fn from(e: AppError) -> Self {
        Self { errors: vec![e] }
    }
}

impl From<AppError> for (StatusCode, Json<ErrorResponse>) {
    fn from(app_error: AppError) -> Self {
        (app_error.status, Json(app_error.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response: (StatusCode, Json<ErrorResponse>) = self.into();
        error_response.into_response()
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        // Infrastructure failures surface as a generic unexpected error;
        // the underlying cause goes to the log, not the client.
        if let FlowError::Store(cause) = &err {
            tracing::error!(%cause, "store failure");
        }
        if let FlowError::Unexpected(cause) = &err {
            tracing::error!(%cause, "unexpected failure");
        }

        match err.message_code() {
            Some(code) => Self::with_code(err.status(), Some(&err), code),
            None => Self::new(err.status(), Some(&err)),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Some(err))
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Some(err))
    }
}

/// Serialize/Deserializer for status codes.
///
/// This is needed because status code according to JSON API spec must
/// be the status code as a STRING.
///
/// We could have used http_serde, but it encodes the status code as a NUMBER.
pub mod serde_status_code {
    use http::StatusCode;
    use serde::{de::Unexpected, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize [StatusCode]s.
    pub fn serialize<S: Serializer>(status: &StatusCode, ser: S) -> Result<S::Ok, S::Error> {
        String::serialize(&status.as_u16().to_string(), ser)
    }

    /// Deserialize [StatusCode]s.
    pub fn deserialize<'de, D>(de: D) -> Result<StatusCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let str = String::deserialize(de)?;
        StatusCode::from_bytes(str.as_bytes()).map_err(|_| {
            serde::de::Error::invalid_value(
                Unexpected::Str(str.as_str()),
                &"A valid http status code",
            )
        })
    }
}

// Needed to support thiserror::Error, outputs debug for AppError
impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
/// Parse the app error out of the json body
pub async fn parse_error(response: Response) -> AppError {
    let body_bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let mut err_response: ErrorResponse = serde_json::from_slice(&body_bytes).unwrap();
    err_response.errors.remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grants::error::message_code;
    use testresult::TestResult;

    #[test]
    fn test_from_anyhow_error() {
        let err: AppError = anyhow::anyhow!("FAIL").into();
        assert_eq!(err.detail.unwrap(), "FAIL".to_string());
        assert_eq!(
            err.title,
            StatusCode::INTERNAL_SERVER_ERROR
                .canonical_reason()
                .map(|r| r.to_string())
        );

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_flow_error_carries_code_and_status() {
        let err: AppError = FlowError::UserNotFound.into();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.detail.as_deref(), Some("User not found"));
        assert_eq!(err.code.as_deref(), Some(message_code::USER_NOT_FOUND));

        let err: AppError = FlowError::NoChanges.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_json_api_error_response() -> TestResult {
        // verify that our json api response complies with the standard
        let err: AppError = FlowError::CodeExpired.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = parse_error(response).await;

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            err.title,
            StatusCode::UNAUTHORIZED
                .canonical_reason()
                .map(|r| r.to_string())
        );
        assert_eq!(err.detail.unwrap(), "Verification code expired");
        assert_eq!(err.code.as_deref(), Some(message_code::VERIFICATION_EXPIRED));

        Ok(())
    }
}
