//! Chat backend abstractions and implementations.
//!
//! A backend opens a [`ChatSession`] from a seed history; the session is
//! consumed by its single exchange. Swapping Gemini for the mock is a matter
//! of handing a different `Arc<dyn ChatBackend>` to the answer service.

pub mod gemini;
pub mod mock;

use crate::models::{Completion, GenerationConfig, SeedHistory};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Error type for backend operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The backend answered with a non-success status.
    #[error("API error {status}: {body}")]
    ApiError {
        status: u16,
        /// `error.message` (or a bare `error` string) from the body.
        message: Option<String>,
        /// `error.status` from the body, e.g. `RESOURCE_EXHAUSTED`.
        reason: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Completion contained no text")]
    EmptyCompletion,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Message(String),
    Detailed {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        status: Option<String>,
    },
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ProviderError {
    /// Classify a non-success backend response, keeping any structured detail.
    pub fn from_response(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let (message, reason) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                error: ErrorField::Message(message),
            }) => (non_empty(Some(message)), None),
            Ok(ErrorBody {
                error: ErrorField::Detailed { message, status },
            }) => (non_empty(message), non_empty(status)),
            Err(_) => (None, None),
        };

        ProviderError::ApiError {
            status,
            message,
            reason,
            body,
        }
    }

    /// Text that may be shown to the caller, if the backend supplied any.
    ///
    /// Prefers the structured message, then the backend's status name.
    /// Transport and parsing failures never expose their text.
    pub fn caller_message(&self) -> Option<&str> {
        match self {
            ProviderError::ApiError {
                message: Some(message),
                ..
            } => Some(message),
            ProviderError::ApiError {
                reason: Some(reason),
                ..
            } => Some(reason),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError { .. } => "api",
            ProviderError::NetworkError(_) => "network",
            ProviderError::MalformedResponse(_) => "malformed",
            ProviderError::ContentFiltered => "content_filter",
            ProviderError::EmptyCompletion => "empty",
        }
    }
}

/// One open conversation, good for exactly one exchange.
#[async_trait]
pub trait ChatSession: Send {
    /// Send the live turn and wait for the completion. Consumes the session.
    async fn send_message(self: Box<Self>, text: &str) -> Result<Completion, ProviderError>;
}

/// A remote generative-language backend that speaks a chat protocol.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Name used in logs and metric labels.
    fn name(&self) -> &str;

    /// Model identifier used in logs and metric labels.
    fn model(&self) -> &str;

    /// Open a session primed with `history`.
    async fn start_chat(
        &self,
        history: SeedHistory,
        config: GenerationConfig,
    ) -> Result<Box<dyn ChatSession>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_error_string_is_the_caller_message() {
        let err = ProviderError::from_response(429, r#"{"error": "quota exceeded"}"#);
        assert_eq!(err.caller_message(), Some("quota exceeded"));
    }

    #[test]
    fn nested_error_message_wins_over_status() {
        let err = ProviderError::from_response(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(err.caller_message(), Some("API key not valid."));
    }

    #[test]
    fn status_name_is_used_when_message_is_missing() {
        let err = ProviderError::from_response(429, r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#);
        assert_eq!(err.caller_message(), Some("RESOURCE_EXHAUSTED"));
    }

    #[test]
    fn unstructured_bodies_expose_nothing() {
        let err = ProviderError::from_response(502, "<html>Bad Gateway</html>");
        assert_eq!(err.caller_message(), None);
        assert!(err.to_string().contains("502"));

        let err = ProviderError::NetworkError("connection reset by peer".to_string());
        assert_eq!(err.caller_message(), None);
    }

    #[test]
    fn blank_messages_are_ignored() {
        let err = ProviderError::from_response(500, r#"{"error": {"message": "  "}}"#);
        assert_eq!(err.caller_message(), None);
    }
}
