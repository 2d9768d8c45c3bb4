//! AI provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub openai_api_key: Option<SecretString>,

    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible endpoint; defaults to the public API.
    pub base_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Character budget for extracted documents fed into prompts.
    #[serde(default = "default_max_source_chars")]
    pub max_source_chars: usize,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Outside production a missing key falls back to the mock provider.
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if environment == Environment::Production && !self.has_openai() {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            max_source_chars: default_max_source_chars(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_max_source_chars() -> usize {
    crate::domain::document::DEFAULT_MAX_CHARS
}
