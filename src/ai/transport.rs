//! Transport Client
//!
//! One call = one network attempt. The transport performs no retries; it
//! classifies every outcome into a [`ModelOutcome`] and leaves the retry
//! decision to the governor.
//!
//! ## Classification
//!
//! - HTTP 429 → `RateLimited`, with the `Retry-After` header (seconds)
//!   when present
//! - timeout / connect / DNS failures → `TransportFailure`
//! - provider error envelope (`error.message`) → `ApiError`
//! - missing completion field on HTTP 200 → `ApiError` with an explicit
//!   "malformed response" message
//! - otherwise → `Success` with the raw completion text

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::provider::{self, Provider};
use super::{ModelId, ModelOutcome, ModelRequest};
use crate::config::LlmConfig;
use crate::types::{Result, TreeError};

// =============================================================================
// Transport Trait
// =============================================================================

/// A single-attempt model call. Implemented over HTTP in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fail-fast check that the selected model can be called at all.
    /// A missing credential is a configuration error, never a retry
    /// condition.
    fn preflight(&self, _model: ModelId) -> Result<()> {
        Ok(())
    }

    /// Issue one network attempt and classify the result.
    async fn send(&self, request: &ModelRequest) -> ModelOutcome;
}

// =============================================================================
// Credentials
// =============================================================================

/// Per-provider API keys, sourced from config with env var fallback.
pub struct Credentials {
    openai: Option<SecretString>,
    gemini: Option<SecretString>,
}

impl Credentials {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            openai: config
                .openai_api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .map(SecretString::from),
            gemini: config
                .gemini_api_key
                .clone()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .map(SecretString::from),
        }
    }

    fn for_model(&self, model: ModelId) -> Option<&SecretString> {
        match model {
            ModelId::Gpt4o => self.openai.as_ref(),
            ModelId::GeminiFlash => self.gemini.as_ref(),
        }
    }

    fn env_var_name(model: ModelId) -> &'static str {
        match model {
            ModelId::Gpt4o => "OPENAI_API_KEY",
            ModelId::GeminiFlash => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai", &self.openai.as_ref().map(|_| "[REDACTED]"))
            .field("gemini", &self.gemini.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// HTTP Transport
// =============================================================================

pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Credentials,
    max_output_tokens: u32,
    openai_api_base: Option<String>,
    gemini_api_base: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| TreeError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials: Credentials::from_config(config),
            max_output_tokens: config.max_output_tokens,
            openai_api_base: config.openai_api_base.clone(),
            gemini_api_base: config.gemini_api_base.clone(),
        })
    }

    fn api_base(&self, model: ModelId) -> Option<&str> {
        match model {
            ModelId::Gpt4o => self.openai_api_base.as_deref(),
            ModelId::GeminiFlash => self.gemini_api_base.as_deref(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn preflight(&self, model: ModelId) -> Result<()> {
        if self.credentials.for_model(model).is_none() {
            return Err(TreeError::Config(format!(
                "no API credential configured for {} (set {} or add it to the config file)",
                model,
                Credentials::env_var_name(model)
            )));
        }
        Ok(())
    }

    async fn send(&self, request: &ModelRequest) -> ModelOutcome {
        let provider = provider::for_model(request.model);

        let Some(api_key) = self.credentials.for_model(request.model) else {
            // preflight() catches this before any attempt is made
            return ModelOutcome::ApiError {
                message: format!("no API credential configured for {}", request.model),
            };
        };

        let url = match provider.endpoint(self.api_base(request.model), api_key) {
            Ok(url) => url,
            Err(e) => {
                return ModelOutcome::ApiError {
                    message: e.to_string(),
                };
            }
        };

        let payload = provider.build_payload(request, self.max_output_tokens);

        debug!(provider = provider.name(), model = %request.model, "Sending model request");

        let mut http_request = self.client.post(url).json(&payload);
        if provider.uses_bearer_auth() {
            http_request = http_request.header(
                AUTHORIZATION,
                format!("Bearer {}", api_key.expose_secret()),
            );
        }

        let response = match http_request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Transport-level failure");
                return ModelOutcome::TransportFailure {
                    message: describe_transport_error(&e),
                };
            }
        };

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            debug!(?retry_after_secs, "Rate limited by provider");
            return ModelOutcome::RateLimited { retry_after_secs };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ModelOutcome::TransportFailure {
                    message: format!("failed to read response body: {}", e),
                };
            }
        };

        classify_body(provider, status, &body)
    }
}

/// Classify a complete HTTP response body. Pure so the mapping is testable
/// without a network.
fn classify_body(provider: &dyn Provider, status: StatusCode, body: &str) -> ModelOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return ModelOutcome::ApiError {
                message: format!("HTTP {} from {}", status.as_u16(), provider.name()),
            };
        }
        Err(e) => {
            return ModelOutcome::ApiError {
                message: format!("malformed response: not JSON ({})", e),
            };
        }
    };

    // The error envelope wins even on HTTP 200; some providers return
    // application errors with a success status.
    if let Some(message) = provider.error_message(&value) {
        return ModelOutcome::ApiError { message };
    }

    if !status.is_success() {
        return ModelOutcome::ApiError {
            message: format!("HTTP {} from {}", status.as_u16(), provider.name()),
        };
    }

    match provider.completion_text(&value) {
        Some(raw_text) => ModelOutcome::Success { raw_text },
        None => ModelOutcome::malformed(provider.completion_field_path()),
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{GeminiProvider, OpenAiProvider};

    fn success_body(text: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"content": text}}]
        })
        .to_string()
    }

    #[test]
    fn test_success_extracts_raw_text() {
        let outcome = classify_body(&OpenAiProvider, StatusCode::OK, &success_body("{}"));
        assert_eq!(
            outcome,
            ModelOutcome::Success {
                raw_text: "{}".to_string()
            }
        );
    }

    #[test]
    fn test_error_envelope_wins_even_on_http_200() {
        let body = serde_json::json!({"error": {"message": "model overloaded"}}).to_string();
        let outcome = classify_body(&OpenAiProvider, StatusCode::OK, &body);
        assert_eq!(
            outcome,
            ModelOutcome::ApiError {
                message: "model overloaded".to_string()
            }
        );
    }

    #[test]
    fn test_missing_field_path_is_malformed() {
        let body = serde_json::json!({"choices": []}).to_string();
        let outcome = classify_body(&OpenAiProvider, StatusCode::OK, &body);
        match outcome {
            ModelOutcome::ApiError { message } => {
                assert!(message.contains("malformed response"));
                assert!(message.contains("choices[0].message.content"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_gemini_field_path_in_malformed_message() {
        let body = serde_json::json!({"candidates": []}).to_string();
        let outcome = classify_body(&GeminiProvider, StatusCode::OK, &body);
        match outcome {
            ModelOutcome::ApiError { message } => {
                assert!(message.contains("candidates[0].content.parts[0].text"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_success_status_without_envelope() {
        let outcome = classify_body(&OpenAiProvider, StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(
            outcome,
            ModelOutcome::ApiError {
                message: "HTTP 500 from openai".to_string()
            }
        );
    }

    #[test]
    fn test_non_json_success_body_is_malformed() {
        let outcome = classify_body(&OpenAiProvider, StatusCode::OK, "not json at all");
        match outcome {
            ModelOutcome::ApiError { message } => assert!(message.contains("not JSON")),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_preflight_rejects_missing_credential() {
        let config = LlmConfig {
            openai_api_key: None,
            gemini_api_key: Some("gm-test".to_string()),
            ..LlmConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();

        // gemini key is configured, openai may still come from the env
        assert!(transport.preflight(ModelId::GeminiFlash).is_ok());

        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = transport.preflight(ModelId::Gpt4o).unwrap_err();
            assert!(matches!(err, TreeError::Config(_)));
            assert!(err.to_string().contains("OPENAI_API_KEY"));
        }
    }
}
