use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only error shape that crosses the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Build a JSON response carrying this envelope.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Errors raised while loading configuration or starting a service.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn envelope_response_carries_status_and_message() {
        let response = ErrorEnvelope::new("nope").into_response_with(StatusCode::BAD_REQUEST);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, ErrorEnvelope::new("nope"));
    }

    #[test]
    fn envelope_serializes_to_error_field_only() {
        let json = serde_json::to_value(ErrorEnvelope::new("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "nope" }));
    }

    #[test]
    fn config_failures_become_config_errors() {
        let err = AppError::from(config::ConfigError::Message("bad port".to_string()));
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("bad port"));
    }

    #[test]
    fn io_failures_become_internal_errors() {
        let err = AppError::from(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "port taken",
        ));
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
