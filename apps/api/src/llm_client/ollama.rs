//! Local Ollama backend (`/api/chat`). Text-only unless the model is a vision model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, CompletionRequest, LlmBackend, LlmError};
use crate::models::document::ImageSource;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    vision: bool,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        vision: bool,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            vision,
        })
    }

    fn build_request<'a>(
        &'a self,
        request: &'a CompletionRequest<'a>,
    ) -> Result<ChatRequest<'a>, LlmError> {
        let images = match request.image {
            None => vec![],
            Some(ImageSource::Base64 { data, .. }) if self.vision => vec![data.as_str()],
            Some(_) => {
                return Err(LlmError::ImageNotSupported {
                    model: self.model.clone(),
                })
            }
        };

        Ok(ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                    images: vec![],
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                    images,
                },
            ],
            stream: false,
            format: request.json_output.then_some("json"),
            options: ChatOptions {
                temperature: request.temperature,
            },
        })
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn supports_images(&self) -> bool {
        self.vision
    }

    /// Ollama takes inline base64 only; a remote URL is as unusable as no vision.
    fn accepts_image(&self, image: &ImageSource) -> bool {
        self.vision && matches!(image, ImageSource::Base64 { .. })
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let body = self.build_request(request)?;

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        debug!(
            "Ollama call succeeded: model={}, eval_count={:?}",
            self.model, chat.eval_count
        );

        if chat.message.content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(chat.message.content)
    }
}
