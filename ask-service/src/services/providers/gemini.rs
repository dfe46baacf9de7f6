//! Gemini chat backend.
//!
//! Gemini's REST surface is stateless, so a "session" is the seed history
//! held client-side and replayed in front of the live turn on
//! `generateContent`.

use super::{ChatBackend, ChatSession, ProviderError};
use crate::models::{ChatRole, Completion, FinishReason, GenerationConfig, SeedHistory};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini chat backend.
pub struct GeminiChatBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiChatBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }
}

#[async_trait]
impl ChatBackend for GeminiChatBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn start_chat(
        &self,
        history: SeedHistory,
        config: GenerationConfig,
    ) -> Result<Box<dyn ChatSession>, ProviderError> {
        let history = history
            .turns()
            .into_iter()
            .map(|turn| Content::text(turn.role, &turn.text))
            .collect();

        Ok(Box::new(GeminiChatSession {
            client: self.client.clone(),
            url: self.api_url("generateContent"),
            api_key: self.config.api_key.clone(),
            model: self.config.model.clone(),
            history,
            generation_config: GenerationConfigBody {
                max_output_tokens: config.max_output_tokens,
            },
        }))
    }
}

/// Seed history plus transport details for one exchange.
struct GeminiChatSession {
    client: Client,
    url: String,
    api_key: Secret<String>,
    model: String,
    history: Vec<Content>,
    generation_config: GenerationConfigBody,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(self: Box<Self>, text: &str) -> Result<Completion, ProviderError> {
        let GeminiChatSession {
            client,
            url,
            api_key,
            model,
            mut history,
            generation_config,
        } = *self;

        history.push(Content::text(ChatRole::User, text));
        let request = GenerateContentRequest {
            contents: history,
            generation_config,
        };

        tracing::debug!(
            model = %model,
            question_len = text.len(),
            max_output_tokens = generation_config.max_output_tokens,
            "Sending chat message to Gemini API"
        );

        let response = client
            .post(&url)
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_response(status, body));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        api_response.into_completion()
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfigBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: ChatRole, text: &str) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    fn into_completion(self) -> Result<Completion, ProviderError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
            return Err(ProviderError::ContentFiltered);
        }

        let usage = self.usage_metadata.unwrap_or_default();
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no candidates".to_string()))?;

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("STOP") | None => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        };

        // Same as the SDK's `response.text()`: every text part, in order.
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(if finish_reason == FinishReason::ContentFilter {
                ProviderError::ContentFiltered
            } else {
                ProviderError::EmptyCompletion
            });
        }

        Ok(Completion {
            text,
            finish_reason,
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Result<Completion, ProviderError> {
        serde_json::from_value::<GenerateContentResponse>(json)
            .unwrap()
            .into_completion()
    }

    #[test]
    fn request_body_matches_gemini_shape() {
        let history = SeedHistory::new("doc");
        let mut contents: Vec<Content> = history
            .turns()
            .into_iter()
            .map(|t| Content::text(t.role, &t.text))
            .collect();
        contents.push(Content::text(ChatRole::User, "q"));

        let body = serde_json::to_value(GenerateContentRequest {
            contents,
            generation_config: GenerationConfigBody {
                max_output_tokens: 200,
            },
        })
        .unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "doc");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "q");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
    }

    #[test]
    fn text_parts_are_concatenated() {
        let completion = parse(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "You have " }, { "text": "2 dogs." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4 }
        }))
        .unwrap();

        assert_eq!(completion.text, "You have 2 dogs.");
        assert_eq!(completion.finish_reason, FinishReason::Complete);
        assert_eq!(completion.input_tokens, 12);
        assert_eq!(completion.output_tokens, 4);
    }

    #[test]
    fn truncated_completion_is_returned_as_is() {
        let completion = parse(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "partial answ" }] },
                "finishReason": "MAX_TOKENS"
            }]
        }))
        .unwrap();

        assert_eq!(completion.text, "partial answ");
        assert_eq!(completion.finish_reason, FinishReason::Length);
    }

    #[test]
    fn safety_stop_without_text_is_content_filtered() {
        let err = parse(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap_err();
        assert_eq!(err, ProviderError::ContentFiltered);

        let err = parse(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap_err();
        assert_eq!(err, ProviderError::ContentFiltered);
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let err = parse(serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
