//! Anthropic Messages API backend. Accepts image content blocks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, CompletionRequest, LlmBackend, LlmError};
use crate::models::document::ImageSource;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageBlockSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ImageBlockSource<'a> {
    Base64 { media_type: &'a str, data: &'a str },
    Url { url: &'a str },
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ReplyBlock>,
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// The first `text` block; thinking and tool blocks are skipped.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key,
            model,
        })
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest<'a>) -> AnthropicRequest<'a> {
        let mut content = Vec::with_capacity(2);
        if let Some(image) = request.image {
            let source = match image {
                ImageSource::Base64 { media_type, data } => ImageBlockSource::Base64 {
                    media_type: media_type.as_str(),
                    data: data.as_str(),
                },
                ImageSource::Url(url) => ImageBlockSource::Url { url: url.as_str() },
            };
            content.push(RequestBlock::Image { source });
        }
        content.push(RequestBlock::Text {
            text: request.prompt,
        });

        AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: request.temperature,
            system: request.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content,
            }],
        }
    }
}

#[async_trait]
impl LlmBackend for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn supports_images(&self) -> bool {
        true
    }

    /// Single call to the Messages API. No retries: a failure is reported as-is.
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: MessagesResponse = response.json().await?;
        debug!(
            "Anthropic call succeeded: model={}, input_tokens={}, output_tokens={}",
            self.model, reply.usage.input_tokens, reply.usage.output_tokens
        );

        reply.into_text().ok_or(LlmError::EmptyContent)
    }
}
