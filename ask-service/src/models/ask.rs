//! Request/response payloads and the values that flow through `/api/ask`.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Text used when a caller asks for an answer without a document.
pub const DEFAULT_CONTEXT_TEXT: &str = "Hello, I have 2 dogs in my house.";

/// Inbound body of `POST /api/ask`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(custom(function = "validate_question"))]
    pub question: String,
}

fn validate_question(question: &str) -> Result<(), ValidationError> {
    if question.trim().is_empty() {
        return Err(ValidationError::new("blank_question"));
    }
    Ok(())
}

/// Successful body of `POST /api/ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// A caller question that is known to contain non-whitespace text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    /// The text as the caller sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Background text that grounds a chat session. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDocument(String);

impl ContextDocument {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContextDocument {
    fn default() -> Self {
        Self(DEFAULT_CONTEXT_TEXT.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_questions_are_rejected() {
        assert!(Question::new("").is_none());
        assert!(Question::new("   \n\t").is_none());
    }

    #[test]
    fn question_keeps_original_text() {
        let question = Question::new("  how many dogs?  ").unwrap();
        assert_eq!(question.as_str(), "  how many dogs?  ");
        assert_eq!(question.to_string(), "  how many dogs?  ");
    }

    #[test]
    fn request_validation_rejects_whitespace() {
        let request = AskRequest {
            question: "    ".to_string(),
        };
        assert!(request.validate().is_err());

        let request = AskRequest {
            question: "hi".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn context_document_must_not_be_empty() {
        assert!(ContextDocument::new("").is_none());
        assert_eq!(ContextDocument::default().as_str(), DEFAULT_CONTEXT_TEXT);
    }
}
