use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::agent_builder::GeneratorError;

/// Fixed user-facing message for a failed generation call. Upstream detail
/// stays in the logs.
pub const GENERATION_FAILED_MSG: &str = "An unexpected error occurred while building the agent. \
     The AI model may be temporarily unavailable. Please try again later.";

/// Fixed user-facing message for a failed contact dispatch.
pub const CONTACT_FAILED_MSG: &str =
    "We could not send your message right now. Please try again later.";

/// Custom error type for the application
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Generation(GeneratorError),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Generation(err) => {
                error!("Agent generation failed: {}", err);
                (StatusCode::BAD_GATEWAY, GENERATION_FAILED_MSG.to_string())
            }
        };

        let body = Json(ErrorBody { error: message });

        (status, body).into_response()
    }
}

impl From<GeneratorError> for AppError {
    fn from(err: GeneratorError) -> Self {
        AppError::Generation(err)
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generation_error_collapses_to_generic_message() {
        let err = AppError::Generation(GeneratorError::Upstream("provider exploded".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], GENERATION_FAILED_MSG);

        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains("provider exploded"));
    }

    #[tokio::test]
    async fn test_validation_error_keeps_its_message() {
        let err = AppError::ValidationError("Requirements cannot be empty".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Requirements cannot be empty");
    }
}
