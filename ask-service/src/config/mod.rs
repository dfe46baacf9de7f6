use crate::models::DEFAULT_MAX_OUTPUT_TOKENS;
use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Stand-in credential when `GOOGLE_API_KEY` is absent. The backend rejects
/// it, so every non-triggered question fails with an authentication error.
pub const MISSING_API_KEY_SENTINEL: &str = "없음";

const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DOCUMENT_PATH: &str = "document.txt";

#[derive(Debug, Clone)]
pub struct AskConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub document: DocumentConfig,
    pub triggers: TriggerConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Chat model, e.g. `gemini-1.5-flash`.
    pub chat_model: String,
    /// Generation ceiling per completion.
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerConfig {
    /// Optional JSON object of extra trigger entries.
    pub file: Option<PathBuf>,
}

impl AskConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(AskConfig {
            common,
            google: GoogleConfig {
                api_key: Secret::new(api_key_from_env()),
                api_base: get_env("GEMINI_API_BASE", GEMINI_API_BASE),
                timeout: Duration::from_secs(parse_env(
                    "ASK_BACKEND_TIMEOUT_SECS",
                    DEFAULT_BACKEND_TIMEOUT_SECS,
                )?),
            },
            models: ModelConfig {
                chat_model: get_env("ASK_CHAT_MODEL", DEFAULT_CHAT_MODEL),
                max_output_tokens: parse_env("ASK_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)?,
            },
            document: DocumentConfig {
                path: PathBuf::from(get_env("ASK_DOCUMENT_PATH", DEFAULT_DOCUMENT_PATH)),
            },
            triggers: TriggerConfig {
                file: env::var("ASK_TRIGGER_FILE")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from),
            },
        })
    }

    /// Whether the credential is the missing-key sentinel.
    pub fn uses_sentinel_api_key(&self) -> bool {
        self.google.api_key.expose_secret() == MISSING_API_KEY_SENTINEL
    }
}

fn api_key_from_env() -> String {
    match env::var("GOOGLE_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => MISSING_API_KEY_SENTINEL.to_string(),
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("ASK_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        env::set_var("ASK_TEST_GARBAGE_NUMBER", "two hundred");
        let result: Result<u32, _> = parse_env("ASK_TEST_GARBAGE_NUMBER", 200);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
        env::remove_var("ASK_TEST_GARBAGE_NUMBER");
    }
}
