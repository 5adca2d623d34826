//! Provider Abstraction
//!
//! Each supported model endpoint differs in payload shape, authentication
//! style, and the field path of the completion text. Those differences live
//! behind the [`Provider`] trait so adding an endpoint means adding a
//! variant here, not branching through the transport.

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

use secrecy::SecretString;
use serde_json::Value;
use url::Url;

use crate::ai::{ModelId, ModelRequest};
use crate::types::Result;

/// Provider-specific request/response adaptation.
///
/// Implementations are stateless: credentials and tuning parameters are
/// passed in per call so a single transport can serve both providers.
pub trait Provider: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Request URL, including any auth query parameters the provider
    /// expects (Gemini carries its key in the query string).
    fn endpoint(&self, api_base: Option<&str>, api_key: &SecretString) -> Result<Url>;

    /// True when the key travels as a bearer token header rather than in
    /// the endpoint URL.
    fn uses_bearer_auth(&self) -> bool;

    /// Wire payload for one generation request.
    fn build_payload(&self, request: &ModelRequest, max_output_tokens: u32) -> Value;

    /// Completion text from a success body, `None` when the documented
    /// field path is absent.
    fn completion_text(&self, body: &Value) -> Option<String>;

    /// Human-readable dotted path of the completion field, for malformed
    /// response messages.
    fn completion_field_path(&self) -> &'static str;

    /// Message from an error envelope. Both supported providers use
    /// `error.message`.
    fn error_message(&self, body: &Value) -> Option<String> {
        body.get("error")?
            .get("message")?
            .as_str()
            .map(String::from)
    }
}

/// Select the provider implementation for a model.
pub fn for_model(model: ModelId) -> &'static dyn Provider {
    match model {
        ModelId::Gpt4o => &OpenAiProvider,
        ModelId::GeminiFlash => &GeminiProvider,
    }
}
