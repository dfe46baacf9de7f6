//! Answer generation over a fresh, single-use chat session.

use crate::models::{Completion, ContextDocument, GenerationConfig, Question, SeedHistory};
use crate::services::metrics;
use crate::services::providers::{ChatBackend, ProviderError};
use std::sync::Arc;
use std::time::Instant;

/// Opens one session per question and returns the completion text verbatim.
///
/// There is no retry and no caching: each call is exactly one session and
/// one exchange against the backend.
#[derive(Clone)]
pub struct AnswerService {
    backend: Arc<dyn ChatBackend>,
    generation: GenerationConfig,
}

impl AnswerService {
    pub fn new(backend: Arc<dyn ChatBackend>, generation: GenerationConfig) -> Self {
        Self {
            backend,
            generation,
        }
    }

    /// Answer `question` grounded in `document`.
    pub async fn generate_answer(
        &self,
        question: &Question,
        document: &ContextDocument,
    ) -> Result<String, ProviderError> {
        let model = self.backend.model().to_string();
        let started = Instant::now();

        let result = self.exchange(question, document).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(completion) => {
                metrics::record_backend_exchange(&model, completion.finish_reason.as_str(), elapsed);
                metrics::record_tokens(&model, completion.input_tokens, completion.output_tokens);
                tracing::info!(
                    provider = %self.backend.name(),
                    model = %model,
                    finish_reason = completion.finish_reason.as_str(),
                    answer_len = completion.text.len(),
                    elapsed_secs = elapsed,
                    "Generated answer"
                );
            }
            Err(e) => {
                metrics::record_backend_exchange(&model, e.kind(), elapsed);
                tracing::error!(
                    provider = %self.backend.name(),
                    model = %model,
                    error = %e,
                    error_kind = e.kind(),
                    "Chat backend call failed"
                );
            }
        }

        result.map(|completion| completion.text)
    }

    /// Answer `question` grounded in the built-in fallback document.
    pub async fn generate_answer_with_default_context(
        &self,
        question: &Question,
    ) -> Result<String, ProviderError> {
        self.generate_answer(question, &ContextDocument::default())
            .await
    }

    async fn exchange(
        &self,
        question: &Question,
        document: &ContextDocument,
    ) -> Result<Completion, ProviderError> {
        let history = SeedHistory::new(document.as_str());
        let session = self.backend.start_chat(history, self.generation).await?;
        session.send_message(question.as_str()).await
    }
}
