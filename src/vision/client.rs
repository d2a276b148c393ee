//! Vision API client for image analysis
//!
//! Uses an Ollama-compatible `/api/generate` endpoint with a vision model

use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::Frame;
use crate::{Error, Result};

/// Default vision model
pub const DEFAULT_VISION_MODEL: &str = "qwen3-vl:2b";

/// Vision client for image analysis
pub struct VisionClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

/// Generate request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

/// Generate response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl VisionClient {
    /// Create a new vision client for the Ollama server at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model,
        })
    }

    /// Describe a captured frame
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the answer is unreadable
    pub async fn describe(&self, frame: &Frame, prompt: &str) -> Result<String> {
        let image = base64::engine::general_purpose::STANDARD.encode(&frame.bytes);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            images: vec![image],
            stream: false,
        };

        tracing::debug!(
            model = %self.model,
            image_bytes = frame.bytes.len(),
            "requesting image description"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_request("vision", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                service: "vision",
                status: status.as_u16(),
                body,
            });
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::from_request("vision", e))?;

        let description = result.response.trim().to_string();
        tracing::debug!(description = %description, "image described");
        Ok(description)
    }
}
