use crate::error::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-specific error wrapper that converts AppError into HTTP responses.
///
/// Upstream failures are logged here and answered with a generic message so
/// storage details never leak to public clients.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Compile { .. } => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Storage(msg) => {
                tracing::error!("Upstream failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream service unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}
