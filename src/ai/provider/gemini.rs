//! Google Gemini Provider
//!
//! API key travels as a `key` query parameter; completion text at
//! `candidates[0].content.parts[0].text`, error envelope at
//! `error.message`. Chat roles are not used: the system prompt is folded
//! into the single text part.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use url::Url;

use super::Provider;
use crate::ai::{ModelRequest, prompt};
use crate::constants::model as model_constants;
use crate::types::{Result, TreeError};

/// Model segment of the generateContent path.
const WIRE_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider;

impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn endpoint(&self, api_base: Option<&str>, api_key: &SecretString) -> Result<Url> {
        let base = api_base.unwrap_or(model_constants::GEMINI_API_BASE);
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            base.trim_end_matches('/'),
            WIRE_MODEL
        ))
        .map_err(|e| TreeError::Config(format!("invalid Gemini API base '{}': {}", base, e)))?;

        url.query_pairs_mut()
            .append_pair("key", api_key.expose_secret());

        Ok(url)
    }

    fn uses_bearer_auth(&self) -> bool {
        false
    }

    fn build_payload(&self, request: &ModelRequest, max_output_tokens: u32) -> Value {
        let text = format!(
            "{}\n\n{}",
            prompt::SYSTEM_PROMPT,
            prompt::render_user_prompt(request)
        );

        json!({
            "contents": [
                { "parts": [ { "text": text } ] }
            ],
            "generationConfig": {
                "temperature": model_constants::GEMINI_TEMPERATURE,
                "maxOutputTokens": max_output_tokens
            }
        })
    }

    fn completion_text(&self, body: &Value) -> Option<String> {
        body.get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(String::from)
    }

    fn completion_field_path(&self) -> &'static str {
        "candidates[0].content.parts[0].text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ModelId, build_request};

    fn sample_request() -> ModelRequest {
        build_request(
            ModelId::GeminiFlash,
            vec!["Transformers are used in LLMs".to_string()],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let payload = GeminiProvider.build_payload(&sample_request(), 4000);

        let text = payload["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Transformers are used in LLMs"));
        assert!(text.ends_with(prompt::ONLY_JSON_INSTRUCTION));

        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 4000);
        assert!(payload["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_endpoint_carries_key_as_query_parameter() {
        let key = SecretString::from("gm-test");
        let url = GeminiProvider.endpoint(None, &key).unwrap();

        assert!(url.path().ends_with("models/gemini-2.0-flash:generateContent"));
        assert!(url.query_pairs().any(|(k, v)| k == "key" && v == "gm-test"));
        assert!(!GeminiProvider.uses_bearer_auth());
    }

    #[test]
    fn test_completion_text_field_path() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [ { "text": "tree json" } ], "role": "model" }
            }]
        });
        assert_eq!(
            GeminiProvider.completion_text(&body).as_deref(),
            Some("tree json")
        );

        let missing = serde_json::json!({"candidates": [{"content": {}}]});
        assert!(GeminiProvider.completion_text(&missing).is_none());
    }
}
