//! Request-level error taxonomy for `/api/ask`.
//!
//! | Variant | Status | Message |
//! |---------|--------|---------|
//! | `MissingQuestion` | 400 | localized "please enter a question" |
//! | `MethodNotAllowed` | 405 | `Method Not Allowed` |
//! | `NotFound` | 404 | localized "endpoint not found" |
//! | `ContextLoad` | 500 | localized "cannot load document" |
//! | `Backend` | 500 | provider message, else localized fallback |
//! | `Unknown` | 500 | localized "internal server error" |

use crate::services::document_loader::DocumentLoadError;
use crate::services::metrics;
use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::ErrorEnvelope;
use thiserror::Error;

pub const MISSING_QUESTION_MESSAGE: &str = "질문을 입력해주세요.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const NOT_FOUND_MESSAGE: &str = "엔드포인트를 찾을 수 없습니다.";
pub const CONTEXT_LOAD_MESSAGE: &str = "문서를 로드할 수 없습니다.";
pub const BACKEND_FALLBACK_MESSAGE: &str = "답변을 생성할 수 없습니다.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "서버 내부 오류입니다.";

#[derive(Debug, Error)]
pub enum AskError {
    /// Missing, non-string, or blank `question`, or an unreadable body.
    #[error("Missing question: {0}")]
    MissingQuestion(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Context load error: {0}")]
    ContextLoad(#[from] DocumentLoadError),

    #[error("Backend error: {0}")]
    Backend(#[from] ProviderError),

    #[error("Unknown error: {0}")]
    Unknown(anyhow::Error),
}

impl AskError {
    pub fn status(&self) -> StatusCode {
        match self {
            AskError::MissingQuestion(_) => StatusCode::BAD_REQUEST,
            AskError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AskError::NotFound(_) => StatusCode::NOT_FOUND,
            AskError::ContextLoad(_) | AskError::Backend(_) | AskError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The sanitized text the caller receives.
    pub fn public_message(&self) -> String {
        match self {
            AskError::MissingQuestion(_) => MISSING_QUESTION_MESSAGE.to_string(),
            AskError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED_MESSAGE.to_string(),
            AskError::NotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            AskError::ContextLoad(_) => CONTEXT_LOAD_MESSAGE.to_string(),
            AskError::Backend(err) => err
                .caller_message()
                .unwrap_or(BACKEND_FALLBACK_MESSAGE)
                .to_string(),
            AskError::Unknown(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    /// Label for the `ask_requests_total` outcome; `None` for stray routes.
    pub fn outcome(&self) -> Option<&'static str> {
        match self {
            AskError::MissingQuestion(_) | AskError::MethodNotAllowed(_) => Some("rejected"),
            AskError::NotFound(_) => None,
            AskError::ContextLoad(_) => Some("context_error"),
            AskError::Backend(_) => Some("backend_error"),
            AskError::Unknown(_) => Some("unknown_error"),
        }
    }
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(outcome) = self.outcome() {
            metrics::record_ask_outcome(outcome);
        }
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Ask request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Ask request rejected");
        }

        ErrorEnvelope::new(self.public_message()).into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_backend_message_is_passed_through() {
        let err = AskError::from(ProviderError::from_response(
            429,
            r#"{"error": "quota exceeded"}"#,
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "quota exceeded");
    }

    #[test]
    fn unstructured_backend_error_uses_fallback() {
        let err = AskError::from(ProviderError::NetworkError(
            "dns error: no such host".to_string(),
        ));
        assert_eq!(err.public_message(), BACKEND_FALLBACK_MESSAGE);
    }

    #[test]
    fn context_errors_do_not_leak_paths() {
        let err = AskError::from(DocumentLoadError::Empty {
            path: "/srv/secret/document.txt".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), CONTEXT_LOAD_MESSAGE);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = AskError::MissingQuestion("blank".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), MISSING_QUESTION_MESSAGE);
    }

    #[test]
    fn unknown_maps_to_generic_500() {
        let err = AskError::Unknown(anyhow::anyhow!("task join failed"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), UNKNOWN_ERROR_MESSAGE);
    }
}
