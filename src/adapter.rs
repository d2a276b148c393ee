//! Seams between the session and the outside world
//!
//! Each trait wraps one device or remote service. The live implementations
//! live in [`crate::voice`], [`crate::vision`] and [`crate::chat`]; tests
//! substitute fakes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::Result;
use crate::session::ChatMessage;
use crate::vision::Frame;
use crate::voice::AudioClip;

/// A recognized spoken phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub heard_at: DateTime<Local>,
}

impl Utterance {
    /// Stamp `text` with the current time
    #[must_use]
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heard_at: Local::now(),
        }
    }
}

/// Result of one listen call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    /// Something was said and recognized
    Utterance(Utterance),
    /// Silence, unintelligible audio, or a recognition failure
    Nothing,
    /// The input source has ended and will never produce more
    Closed,
}

/// Source of utterances
#[async_trait]
pub trait SpeechInput: Send {
    /// Wait up to `timeout` for speech to start and record at most
    /// `phrase_limit` of it
    async fn listen(&mut self, timeout: Duration, phrase_limit: Duration) -> Heard;
}

/// Camera plus image description
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Capture one still frame
    ///
    /// # Errors
    ///
    /// Returns `Error::Device` if no camera can be used
    async fn capture(&self) -> Result<Frame>;

    /// Describe a frame, guided by `prompt`
    ///
    /// # Errors
    ///
    /// Returns error if the remote analysis fails
    async fn describe(&self, frame: &Frame, prompt: &str) -> Result<String>;
}

/// Remote conversational completion
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Complete a conversation, returning the assistant's reply
    ///
    /// # Errors
    ///
    /// Returns error if the remote call fails
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Speaks text aloud; never fails from the caller's point of view
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, returning once playback has finished
    async fn speak(&self, text: &str);
}

/// Local audio output
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play a clip to completion
    ///
    /// # Errors
    ///
    /// Returns error if playback fails
    async fn play(&self, clip: AudioClip) -> Result<()>;
}
