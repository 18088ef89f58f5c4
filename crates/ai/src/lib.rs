//! Text-generation collaborator.
//!
//! Flows depend on the [`TextGenerator`] trait; [`api::OpenAiClient`] is the
//! production implementation talking to an OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod api;

use async_trait::async_trait;

pub use api::{OpenAiClient, OpenAiConfig};

/// One prompt-in, text-out request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    /// Upper bound on generated tokens; `None` leaves it to the provider.
    pub max_tokens: Option<u32>,
}

/// Errors from a text-generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Text generation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered but produced no text.
    #[error("Text generation returned no content")]
    EmptyCompletion,

    /// Any other backend failure (used by non-HTTP implementations).
    #[error("Text generation failed: {0}")]
    Other(String),
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
