//! OpenAI chat completions provider.
//!
//! Works against the hosted API or any endpoint implementing
//! `POST /v1/chat/completions`.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use khub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat message in OpenAI wire format.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI LLM client.
pub struct OpenAiClient {
    /// Base URL for the API (without the `/v1/...` path)
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for the hosted OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client for a custom, OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Replace the HTTP client with one that enforces a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Convert LlmRequest to OpenAI format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert OpenAI response to LlmResponse.
    ///
    /// No choices is not an error: the caller decides what an empty answer means.
    fn convert_response(&self, response: ChatResponse) -> AppResult<LlmResponse> {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content = match response.choices.into_iter().next() {
            None => String::new(),
            Some(choice) => {
                let message = choice.message.ok_or_else(|| {
                    AppError::Llm(
                        "`message` property was not found in the response body received from OpenAI"
                            .to_string(),
                    )
                })?;
                message.content
            }
        };

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to OpenAI");

        let chat_request = self.to_chat_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Could not complete request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "OpenAI sent back status code {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Could not parse response from OpenAI: {}", e)))?;

        tracing::debug!(
            choices = chat_response.choices.len(),
            "Received completion from OpenAI"
        );

        self.convert_response(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_chat_request_conversion() {
        let client = OpenAiClient::new("sk-test");
        let request = LlmRequest::new("Hello", "gpt-3.5-turbo")
            .with_system("Be brief")
            .with_temperature(0.0);

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.model, "gpt-3.5-turbo");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.messages[1].content, "Hello");
        assert_eq!(chat.temperature, Some(0.0));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OpenAiClient::with_base_url("http://localhost:1234/", "k");
        assert_eq!(client.base_url, "http://localhost:1234");
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({ "model": "gpt-3.5-turbo" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "choices": [
                    { "message": { "role": "assistant", "content": "[\"section 54\"]" } }
                ],
                "usage": { "prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25 }
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri(), "sk-test");
        let response = client
            .complete(&LlmRequest::new("q", "gpt-3.5-turbo"))
            .await
            .unwrap();

        assert_eq!(response.content, "[\"section 54\"]");
        assert_eq!(response.usage, LlmUsage::new(20, 5));
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri(), "sk-test");
        let response = client
            .complete(&LlmRequest::new("q", "gpt-3.5-turbo"))
            .await
            .unwrap();

        assert!(response.content.is_empty());
    }

    #[tokio::test]
    async fn test_complete_choice_without_message_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "choices": [{ "index": 0 }] })),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri(), "sk-test");
        let result = client.complete(&LlmRequest::new("q", "gpt-3.5-turbo")).await;

        assert!(matches!(result, Err(AppError::Llm(msg)) if msg.contains("`message`")));
    }

    #[tokio::test]
    async fn test_complete_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::with_base_url(server.uri(), "bad");
        let result = client.complete(&LlmRequest::new("q", "gpt-3.5-turbo")).await;

        match result {
            Err(AppError::Llm(msg)) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid api key"));
            }
            other => panic!("expected LLM error, got: {:?}", other.map(|r| r.content)),
        }
    }
}
