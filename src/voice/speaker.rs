//! Speech output: sanitize, synthesize with one timeout retry, play

use std::time::Duration;

use async_trait::async_trait;

use super::playback::AudioClip;
use super::tts::{TextToSpeech, VoiceNameFilter};
use crate::Result;
use crate::adapter::{AudioSink, SpeechOutput};

/// Timeouts for synthesis requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisTimeouts {
    /// First attempt
    pub request: Duration,
    /// The single retry after a timeout
    pub retry: Duration,
    /// Pause before retrying
    pub backoff: Duration,
}

impl Default for SynthesisTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(120),
            retry: Duration::from_secs(180),
            backoff: Duration::from_secs(2),
        }
    }
}

/// Speaks text through a TTS service and an audio sink
pub struct Speaker<S> {
    tts: TextToSpeech,
    sink: S,
    filter: VoiceNameFilter,
    timeouts: SynthesisTimeouts,
}

impl<S: AudioSink> Speaker<S> {
    #[must_use]
    pub fn new(tts: TextToSpeech, sink: S, timeouts: SynthesisTimeouts) -> Self {
        let filter = VoiceNameFilter::new(&tts.settings().voice);
        Self {
            tts,
            sink,
            filter,
            timeouts,
        }
    }

    /// Synthesize, retrying exactly once if the first attempt timed out
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match self.tts.synthesize(text, self.timeouts.request).await {
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    backoff_ms = self.timeouts.backoff.as_millis(),
                    "speech synthesis timed out - server may be busy, trying again"
                );
                tokio::time::sleep(self.timeouts.backoff).await;
                self.tts.synthesize(text, self.timeouts.retry).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl<S: AudioSink> SpeechOutput for Speaker<S> {
    async fn speak(&self, text: &str) {
        tracing::info!(text, "mirror says");

        let text = self.filter.apply(text);
        if text.is_empty() {
            tracing::debug!("nothing to speak after sanitizing");
            return;
        }

        let audio = match self.synthesize(&text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis failed");
                return;
            }
        };

        let clip = match AudioClip::decode(&audio) {
            Ok(clip) => clip,
            Err(e) => {
                tracing::error!(error = %e, bytes = audio.len(), "could not decode speech audio");
                return;
            }
        };

        tracing::debug!(duration_ms = clip.duration().as_millis(), "playing speech");
        if let Err(e) = self.sink.play(clip).await {
            tracing::error!(error = %e, "speech playback failed");
        }
    }
}
