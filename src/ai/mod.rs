//! Model Call Pipeline
//!
//! Everything between a list of text fragments and a validated
//! [`KnowledgeNode`](crate::types::KnowledgeNode):
//!
//! ## Modules
//!
//! - `prompt`: deterministic request construction from fragments
//! - `provider`: per-provider payload shapes and response field paths
//! - `transport`: one HTTP attempt, classified into a [`ModelOutcome`]
//! - `retry`: rate-limit backoff state machine around the transport
//! - `extract`: tolerant JSON recovery and schema validation

pub mod extract;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod transport;

pub use extract::extract;
pub use prompt::build_request;
pub use provider::Provider;
pub use retry::{CancelHandle, RetryGovernor, RetryPolicy};
pub use transport::{HttpTransport, Transport};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// Model Identity
// =============================================================================

/// Supported models, one per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelId {
    /// OpenAI chat-completions provider
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    /// Google Gemini generateContent provider
    #[serde(rename = "gemini-2.0-flash")]
    GeminiFlash,
}

impl ModelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::GeminiFlash => "gemini-2.0-flash",
        }
    }

    pub fn all() -> [ModelId; 2] {
        [Self::Gpt4o, Self::GeminiFlash]
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gpt-4o" | "openai" => Ok(Self::Gpt4o),
            "gemini-2.0-flash" | "gemini" => Ok(Self::GeminiFlash),
            _ => Err(format!(
                "unknown model '{}'. Supported: gpt-4o, gemini-2.0-flash",
                s
            )),
        }
    }
}

// =============================================================================
// Model Request
// =============================================================================

/// One generation request, built per user action and discarded after use.
///
/// Construct via [`prompt::build_request`], which rejects an empty fragment
/// list.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: ModelId,
    pub fragments: Vec<String>,
    pub structure_hint: Option<String>,
}

// =============================================================================
// Model Outcome
// =============================================================================

/// Classified result of a single network attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    /// HTTP success with the raw textual completion.
    Success { raw_text: String },
    /// HTTP 429; `retry_after_secs` carries the Retry-After header when the
    /// server sent one.
    RateLimited { retry_after_secs: Option<u64> },
    /// The provider answered with an error envelope, a non-success status,
    /// or a body missing the expected completion field.
    ApiError { message: String },
    /// The request never produced an HTTP response.
    TransportFailure { message: String },
}

impl ModelOutcome {
    /// An HTTP 200 body that lacks the documented completion field path.
    pub fn malformed(field_path: &str) -> Self {
        Self::ApiError {
            message: format!("malformed response: missing {}", field_path),
        }
    }
}

// =============================================================================
// Progress Notifications
// =============================================================================

/// Progress events for a single generation, emitted in attempt order.
///
/// This is an output channel only: callers may render or drop events, and
/// nothing in the pipeline depends on them being observed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A network attempt is starting.
    Attempting {
        model: ModelId,
        attempt: u32,
        max_attempts: u32,
    },
    /// Rate limited; emitted before the backoff sleep.
    Backoff { attempt: u32, wait: Duration },
    /// The model answered and extraction succeeded.
    Completed,
    /// Terminal failure, with a user-safe message.
    Failed { message: String },
}

/// Receiver for [`ProgressEvent`]s.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

/// Sink that drops every event.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn notify(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_round_trip() {
        for model in ModelId::all() {
            let parsed: ModelId = model.as_str().parse().unwrap();
            assert_eq!(parsed, model);
        }
    }

    #[test]
    fn test_model_id_provider_shorthand() {
        assert_eq!("openai".parse::<ModelId>().unwrap(), ModelId::Gpt4o);
        assert_eq!("gemini".parse::<ModelId>().unwrap(), ModelId::GeminiFlash);
        assert!("claude".parse::<ModelId>().is_err());
    }

    #[test]
    fn test_model_id_serde_uses_wire_names() {
        let json = serde_json::to_string(&ModelId::GeminiFlash).unwrap();
        assert_eq!(json, "\"gemini-2.0-flash\"");
    }

    #[test]
    fn test_malformed_outcome_is_api_error() {
        let outcome = ModelOutcome::malformed("choices[0].message.content");
        match outcome {
            ModelOutcome::ApiError { message } => {
                assert!(message.contains("choices[0].message.content"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }
}
