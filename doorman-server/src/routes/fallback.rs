//! Catch-all route.

use crate::error::AppError;
use axum::http::StatusCode;

/// 404 handler for unknown paths.
pub async fn notfound_404() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, Some("Route not found"))
}
