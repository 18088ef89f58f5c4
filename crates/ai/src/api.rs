//! REST client for an OpenAI-compatible chat completions endpoint.
//!
//! The whole prompt is sent as a single user message; the first choice's
//! content is returned.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{GenerationError, GenerationRequest, TextGenerator};

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL including the version segment, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    pub api_key: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the text-generation provider.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client with its own connection pool and the configured timeout.
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, returning the body text
    /// in a [`GenerationError::ApiError`] otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            "Requesting text generation"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatCompletionResponse = Self::ensure_success(response).await?.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}
