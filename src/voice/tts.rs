//! Text-to-speech (TTS) processing

use std::time::Duration;

use regex::Regex;

use crate::{Error, Result};

/// Synthesis request parameters
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    /// TTS model (e.g. "orpheus")
    pub model: String,
    /// Voice identifier (e.g. "zac")
    pub voice: String,
    /// Audio container requested from the server ("wav" or "mp3")
    pub response_format: String,
    /// Speed multiplier
    pub speed: f32,
}

/// Synthesizes speech through an OpenAI-compatible `/v1/audio/speech` endpoint
pub struct TextToSpeech {
    client: reqwest::Client,
    url: String,
    settings: VoiceSettings,
}

impl TextToSpeech {
    /// Create a new TTS client for the speech service at `base_url`
    #[must_use]
    pub fn new(base_url: &str, settings: VoiceSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/v1/audio/speech", base_url.trim_end_matches('/')),
            settings,
        }
    }

    /// Voice settings in use
    #[must_use]
    pub const fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes in the configured response format
    ///
    /// # Errors
    ///
    /// Returns `Error::Timeout` if the server does not answer within
    /// `timeout`, or another error if synthesis fails
    pub async fn synthesize(&self, text: &str, timeout: Duration) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.settings.model,
            input: text,
            voice: &self.settings.voice,
            response_format: &self.settings.response_format,
            speed: self.settings.speed,
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_request("tts", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                service: "tts",
                status: status.as_u16(),
                body,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::from_request("tts", e))?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}

/// Removes the voice's own name from text before it is spoken
#[derive(Debug, Clone)]
pub struct VoiceNameFilter {
    pattern: Option<Regex>,
}

impl VoiceNameFilter {
    /// Build a filter for `voice`; blank names filter nothing
    #[must_use]
    pub fn new(voice: &str) -> Self {
        let voice = voice.trim();
        let pattern = if voice.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(voice))).ok()
        };
        Self { pattern }
    }

    /// Strip the voice name, collapsing the whitespace it leaves behind
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let stripped = match &self.pattern {
            Some(pattern) => pattern.replace_all(text, ""),
            None => text.into(),
        };
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
