//! DeepSeek chat client
//!
//! Client for a DeepSeek-shaped (OpenAI-compatible) chat completions API.
//! Every request pins a system message instructing the model to answer with
//! a single JSON intent payload; interpretation of that payload lives in
//! intent validation, not here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::ChatCompletionClient;
use crate::error::{NinesError, Result};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed instruction pinning replies to the action vocabulary.
const SYSTEM_PROMPT: &str = "You are the intent parser for a personal assistant. \
Reply with exactly one JSON object and nothing else: \
{\"intent\": \"<name>\", \"parameters\": {...}}. \
Known intents: create_note {title, content}, \
create_document {type, content, filename}, check_email {}.";

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Text content (may be null)
    content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Chat client for the configured completions endpoint.
pub struct DeepSeekClient {
    api_key: String,
    api_base: String,
    model: String,
    client: Client,
}

impl DeepSeekClient {
    /// Create a client. A trailing slash on the base URL is removed.
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletionClient for DeepSeekClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(model = %self.model, "chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| NinesError::ExternalService(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NinesError::ExternalService(format!(
                "chat API error ({}): {}",
                status,
                truncate(&body, 200)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            NinesError::ExternalService(format!("cannot parse chat response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| NinesError::ExternalService("chat response has no content".to_string()))
    }

    fn name(&self) -> &str {
        "deepseek"
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(raw: &str) -> serde_json::Value {
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": raw } }
            ]
        })
    }

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = DeepSeekClient::new("sk-test", "https://api.deepseek.com/v1/", "deepseek-chat");
        assert_eq!(client.api_base, "https://api.deepseek.com/v1");
        assert_eq!(client.name(), "deepseek");
    }

    #[tokio::test]
    async fn test_complete_returns_raw_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(r#"{"intent":"check_email"}"#)),
            )
            .mount(&server)
            .await;

        let client = DeepSeekClient::new("sk-test", &server.uri(), "deepseek-chat");
        let raw = client.complete("check my email").await.unwrap();
        assert_eq!(raw, r#"{"intent":"check_email"}"#);
    }

    #[tokio::test]
    async fn test_request_pins_system_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "note this down" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = DeepSeekClient::new("sk-test", &server.uri(), "deepseek-chat");
        client.complete("note this down").await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_maps_to_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = DeepSeekClient::new("sk-test", &server.uri(), "deepseek-chat");
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, NinesError::ExternalService(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_empty_choices_maps_to_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let client = DeepSeekClient::new("sk-test", &server.uri(), "deepseek-chat");
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, NinesError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = DeepSeekClient::new("sk-test", &server.uri(), "deepseek-chat");
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, NinesError::ExternalService(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 10), "ab");
        assert_eq!(truncate("héllo wörld", 5), "héllo");
    }
}
