/// LLM Client — the model boundary for the critic.
///
/// Every model call goes through an `LlmBackend`. Backends make exactly one HTTP
/// attempt per call and return the reply text unparsed; turning that text into a
/// critique is the caller's job.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::models::document::ImageSource;

pub mod anthropic;
pub mod ollama;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Model {model} cannot accept image input")]
    ImageNotSupported { model: String },
}

/// One self-contained generation call: a system instruction and a user instruction.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub image: Option<&'a ImageSource>,
    pub temperature: f32,
    /// Ask the backend to constrain output to JSON where it supports that.
    pub json_output: bool,
}

/// A text-generation backend. Carried as `Arc<dyn LlmBackend>` so the critique
/// service can be exercised against a stub.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model identifier, used in logs and user-facing messages.
    fn model(&self) -> &str;

    /// Whether `CompletionRequest::image` may be set at all.
    fn supports_images(&self) -> bool;

    /// Whether this particular image can be sent. Backends that take only some
    /// image sources narrow this.
    fn accepts_image(&self, _image: &ImageSource) -> bool {
        self.supports_images()
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Returns the span from the first `{` to the last `}` of a model reply.
///
/// Models wrap JSON in prose and ```json fences despite instructions; everything
/// outside the outermost braces is discarded.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
