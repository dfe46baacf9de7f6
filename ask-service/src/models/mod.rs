//! Domain models for the ask service.

pub mod ask;
pub mod chat;

pub use ask::{AskRequest, AskResponse, ContextDocument, Question, DEFAULT_CONTEXT_TEXT};
pub use chat::{
    ChatRole, ChatTurn, Completion, FinishReason, GenerationConfig, SeedHistory,
    DEFAULT_MAX_OUTPUT_TOKENS, SEED_ACKNOWLEDGEMENT,
};
