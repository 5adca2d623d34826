//! OpenAI Chat Completions Provider
//!
//! Bearer-token auth; completion text at `choices[0].message.content`,
//! error envelope at `error.message`.

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

use super::Provider;
use crate::ai::{ModelRequest, prompt};
use crate::constants::model as model_constants;
use crate::types::{Result, TreeError};

/// Pinned chat-completions model name sent on the wire.
const WIRE_MODEL: &str = "gpt-4o-2024-08-06";

pub struct OpenAiProvider;

impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn endpoint(&self, api_base: Option<&str>, _api_key: &SecretString) -> Result<Url> {
        let base = api_base.unwrap_or(model_constants::OPENAI_API_BASE);
        Url::parse(&format!("{}/chat/completions", base.trim_end_matches('/')))
            .map_err(|e| TreeError::Config(format!("invalid OpenAI API base '{}': {}", base, e)))
    }

    fn uses_bearer_auth(&self) -> bool {
        true
    }

    fn build_payload(&self, request: &ModelRequest, max_output_tokens: u32) -> Value {
        json!({
            "model": WIRE_MODEL,
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": prompt::render_user_prompt(request) }
            ],
            "max_tokens": max_output_tokens
        })
    }

    fn completion_text(&self, body: &Value) -> Option<String> {
        body.get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
            .map(String::from)
    }

    fn completion_field_path(&self) -> &'static str {
        "choices[0].message.content"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ModelId, build_request};

    fn sample_request() -> ModelRequest {
        build_request(
            ModelId::Gpt4o,
            vec!["A uses B".to_string(), "B requires C".to_string()],
            Some(String::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let payload = OpenAiProvider.build_payload(&sample_request(), 4000);

        assert_eq!(payload["model"], WIRE_MODEL);
        assert_eq!(payload["max_tokens"], 4000);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["role"], "user");
    }

    #[test]
    fn test_user_message_carries_fragments_and_instruction() {
        let payload = OpenAiProvider.build_payload(&sample_request(), 4000);
        let user = payload["messages"][1]["content"].as_str().unwrap();

        assert!(user.contains("A uses B"));
        assert!(user.contains("B requires C"));
        assert!(user.ends_with(prompt::ONLY_JSON_INSTRUCTION));
    }

    #[test]
    fn test_completion_text_field_path() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"total_tokens": 10}
        });
        assert_eq!(
            OpenAiProvider.completion_text(&body).as_deref(),
            Some("hello")
        );

        let empty = serde_json::json!({"choices": []});
        assert!(OpenAiProvider.completion_text(&empty).is_none());
    }

    #[test]
    fn test_endpoint_default_and_override() {
        let key = SecretString::from("sk-test");
        let url = OpenAiProvider.endpoint(None, &key).unwrap();
        assert_eq!(url.as_str(), "https://api.openai.com/v1/chat/completions");

        let url = OpenAiProvider
            .endpoint(Some("http://localhost:8080/v1/"), &key)
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/chat/completions");
    }
}
