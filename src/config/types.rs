//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/treeloom/) and project (.treeloom/) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::ai::ModelId;
use crate::constants::{network, retry};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Retry governor settings
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `TreeError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(crate::types::TreeError::Config(
                "llm timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::TreeError::Config(format!(
                "llm temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::types::TreeError::Config(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.backoff_base_secs == 0 {
            return Err(crate::types::TreeError::Config(
                "retry backoff_base_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// LLM provider settings.
///
/// API keys are never serialized to output and are redacted in debug
/// output; the transport converts them to `SecretString` for runtime
/// protection.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Default model when the caller does not pick one
    pub default_model: ModelId,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Completion token cap
    pub max_output_tokens: u32,

    /// Generation temperature (Gemini only; OpenAI uses the API default)
    pub temperature: f32,

    /// OpenAI API key (falls back to OPENAI_API_KEY env var)
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Gemini API key (falls back to GEMINI_API_KEY env var)
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// OpenAI-compatible API base URL override
    pub openai_api_base: Option<String>,

    /// Gemini API base URL override
    pub gemini_api_base: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_model: ModelId::Gpt4o,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: network::CONNECT_TIMEOUT_SECS,
            max_output_tokens: crate::constants::model::MAX_OUTPUT_TOKENS,
            temperature: crate::constants::model::GEMINI_TEMPERATURE,
            openai_api_key: None,
            gemini_api_key: None,
            openai_api_base: None,
            gemini_api_base: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("default_model", &self.default_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("temperature", &self.temperature)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("openai_api_base", &self.openai_api_base)
            .field("gemini_api_base", &self.gemini_api_base)
            .finish()
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempt budget per request (first attempt included)
    pub max_attempts: u32,

    /// Exponential backoff base in seconds
    pub backoff_base_secs: u64,

    /// Upper bound on any single backoff sleep in seconds
    pub max_backoff_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            backoff_base_secs: retry::BACKOFF_BASE_SECS,
            max_backoff_secs: retry::MAX_BACKOFF_SECS,
        }
    }
}
