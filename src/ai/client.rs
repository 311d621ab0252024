//! LLM (`OpenAI`) API client module
//!
//! Encapsulates the chat completion call used to write organization summaries.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::core::config::AppConfig;
use crate::errors::ResearchError;

pub const SUMMARY_TEMPERATURE: f64 = 0.3;
pub const SUMMARY_MAX_TOKENS: u32 = 300;

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the service is unreachable, answers with a
    /// non-success status, or returns no text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ResearchError>;
}

/// Chat completion client for `OpenAI`-compatible endpoints.
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ResearchError> {
        Self::with_timeout(config, config.search.request_timeout)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(config: &AppConfig, timeout: Duration) -> Result<Self, ResearchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            org_id: config.openai_org_id.clone(),
            base_url: config.openai_base_url.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn message_to_json(msg: &ChatCompletionMessage) -> Value {
    let role_str = match msg.role {
        MessageRole::system => "system",
        MessageRole::user => "user",
        MessageRole::assistant => "assistant",
        MessageRole::function => "function",
        MessageRole::tool => "tool",
    };
    let content = match &msg.content {
        Content::Text(text) => json!(text),
        Content::ImageUrl(_) => json!([]),
    };
    json!({ "role": role_str, "content": content })
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ResearchError> {
        #[cfg(feature = "debug-logs")]
        info!("Using completion prompt:\n{:?}", request.messages);

        let estimated_input_tokens = request
            .messages
            .iter()
            .map(|msg| match &msg.content {
                Content::Text(text) => estimate_tokens(text),
                Content::ImageUrl(_) => 0,
            })
            .sum::<usize>();
        info!(
            "Requesting completion from {} (~{} input tokens)",
            request.model, estimated_input_tokens
        );

        let body = json!({
            "model": request.model,
            "messages": request.messages.iter().map(message_to_json).collect::<Vec<_>>(),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let mut builder = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(org) = &self.org_id {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ResearchError::HttpError(format!("Completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ResearchError::CompletionError(format!(
                "{status}: {error_text}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ResearchError::CompletionError(format!("Failed to parse completion response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ResearchError::CompletionError("No text in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::prompt_builder::build_prompt;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let mut config = AppConfig::new("sk-test");
        config.openai_base_url = server.base_url();
        config.openai_org_id = Some("org-42".to_string());
        OpenAiClient::new(&config).expect("client")
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-test".to_string(),
            messages: build_prompt("Kresge", "Supports cities."),
            temperature: SUMMARY_TEMPERATURE,
            max_tokens: SUMMARY_MAX_TOKENS,
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[tokio::test]
    async fn sends_model_parameters_and_reads_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .header("OpenAI-Organization", "org-42")
                    .json_body_partial(r#"{"model": "gpt-test", "temperature": 0.3, "max_tokens": 300}"#);
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "  Kresge funds cities.  "}}]
                }));
            })
            .await;

        let text = client_for(&server).complete(request()).await.expect("completion");

        mock.assert_async().await;
        assert_eq!(text, "  Kresge funds cities.  ");
    }

    #[tokio::test]
    async fn error_status_becomes_completion_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(500).body("boom");
            })
            .await;

        let error = client_for(&server)
            .complete(request())
            .await
            .expect_err("error response");

        assert!(matches!(error, ResearchError::CompletionError(ref message) if message.contains("500")));
    }

    #[tokio::test]
    async fn empty_choices_are_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let error = client_for(&server)
            .complete(request())
            .await
            .expect_err("no text");

        assert!(error.to_string().contains("No text in response"));
    }
}
