//! Mock chat backend for testing.
//!
//! Counts every session it opens and every message it receives so tests can
//! assert exactly how often the backend was reached.

use super::{ChatBackend, ChatSession, ProviderError};
use crate::models::{Completion, GenerationConfig, SeedHistory};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the mock does when a message arrives.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Reply with a fixed text.
    Reply(String),
    /// Reply with `Mock response for: <question>`.
    Echo,
    /// Fail the exchange.
    Fail(ProviderError),
    /// Fail while opening the session.
    FailOnStart(ProviderError),
    /// Panic inside the exchange.
    Panic,
}

/// One exchange as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedExchange {
    pub history: SeedHistory,
    pub config: GenerationConfig,
    pub message: String,
}

#[derive(Default)]
struct Calls {
    sessions: AtomicUsize,
    messages: AtomicUsize,
    exchanges: Mutex<Vec<RecordedExchange>>,
}

/// Mock chat backend for testing.
#[derive(Clone)]
pub struct MockChatBackend {
    behavior: MockBehavior,
    calls: Arc<Calls>,
}

impl MockChatBackend {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Calls::default()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    /// Sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.calls.sessions.load(Ordering::SeqCst)
    }

    /// Messages sent so far.
    pub fn messages_sent(&self) -> usize {
        self.calls.messages.load(Ordering::SeqCst)
    }

    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.calls
            .exchanges
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn start_chat(
        &self,
        history: SeedHistory,
        config: GenerationConfig,
    ) -> Result<Box<dyn ChatSession>, ProviderError> {
        self.calls.sessions.fetch_add(1, Ordering::SeqCst);

        if let MockBehavior::FailOnStart(err) = &self.behavior {
            return Err(err.clone());
        }

        Ok(Box::new(MockChatSession {
            behavior: self.behavior.clone(),
            calls: self.calls.clone(),
            history,
            config,
        }))
    }
}

struct MockChatSession {
    behavior: MockBehavior,
    calls: Arc<Calls>,
    history: SeedHistory,
    config: GenerationConfig,
}

#[async_trait]
impl ChatSession for MockChatSession {
    async fn send_message(self: Box<Self>, text: &str) -> Result<Completion, ProviderError> {
        self.calls.messages.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut exchanges) = self.calls.exchanges.lock() {
            exchanges.push(RecordedExchange {
                history: self.history.clone(),
                config: self.config,
                message: text.to_string(),
            });
        }

        match &self.behavior {
            MockBehavior::Reply(reply) => Ok(Completion::text(reply.clone())),
            MockBehavior::Echo => Ok(Completion::text(format!("Mock response for: {}", text))),
            MockBehavior::Fail(err) | MockBehavior::FailOnStart(err) => Err(err.clone()),
            MockBehavior::Panic => panic!("mock backend panicked"),
        }
    }
}
