//! Chat session primitives shared by the answer service and the providers.

use serde::{Deserialize, Serialize};

/// Acknowledgement placed as the model's reply to the context turn.
pub const SEED_ACKNOWLEDGEMENT: &str = "Great to meet you. What would you like to know?";

/// Default generation ceiling for a single completion.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 200;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Caller side: the context document and the live question.
    User,
    /// Backend side: the seeded acknowledgement.
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// A single prior turn in a chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// The two-turn history that primes every session.
///
/// Always `[user: context document, model: acknowledgement]`; built per
/// request and dropped with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedHistory {
    context: ChatTurn,
    acknowledgement: ChatTurn,
}

impl SeedHistory {
    pub fn new(context_text: impl Into<String>) -> Self {
        Self {
            context: ChatTurn::user(context_text),
            acknowledgement: ChatTurn::model(SEED_ACKNOWLEDGEMENT),
        }
    }

    pub fn turns(&self) -> [&ChatTurn; 2] {
        [&self.context, &self.acknowledgement]
    }

    pub fn context_text(&self) -> &str {
        &self.context.text
    }
}

/// Generation settings applied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Hard ceiling; the backend truncates, nothing retries.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Other => "other",
        }
    }
}

/// The single result of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: FinishReason,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: FinishReason::Complete,
            input_tokens: 0,
            output_tokens: 0,
        }
    }
}
