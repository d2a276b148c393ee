//! Chat completion client for an Ollama-compatible `/api/chat` endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::ChatCompleter;
use crate::session::ChatMessage;
use crate::{Error, Result};

/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "llama3";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Sends conversations to the language model
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl ChatClient {
    /// Create a chat client for the Ollama server at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model,
        })
    }
}

#[async_trait]
impl ChatCompleter for ChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                Error::from_request("chat", e)
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "chat response status");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat API error");
            return Err(Error::Remote {
                service: "chat",
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::from_request("chat", e))?;

        tracing::debug!(reply_len = result.message.content.len(), "chat reply received");
        Ok(result.message.content)
    }
}
