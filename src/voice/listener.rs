//! Utterance sources: the microphone, or typed lines for headless use

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

use super::capture::{SAMPLE_RATE, record_utterance, samples_to_wav};
use super::stt::SpeechToText;
use crate::adapter::{Heard, SpeechInput, Utterance};
use crate::{Error, Result};

/// Listens on the default microphone and transcribes remotely
pub struct MicrophoneInput {
    stt: SpeechToText,
    ambient: Duration,
}

impl MicrophoneInput {
    /// Create a microphone input calibrating against `ambient` of room noise
    #[must_use]
    pub const fn new(stt: SpeechToText, ambient: Duration) -> Self {
        Self { stt, ambient }
    }

    async fn hear(&self, timeout: Duration, phrase_limit: Duration) -> Result<Option<Utterance>> {
        let ambient = self.ambient;
        let samples =
            tokio::task::spawn_blocking(move || record_utterance(ambient, timeout, phrase_limit))
                .await
                .map_err(|e| Error::Device(format!("capture task failed: {e}")))??;

        let Some(samples) = samples else {
            return Ok(None);
        };

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        let text = self.stt.transcribe(wav).await?;
        Ok(Some(Utterance::now(text)))
    }
}

#[async_trait]
impl SpeechInput for MicrophoneInput {
    async fn listen(&mut self, timeout: Duration, phrase_limit: Duration) -> Heard {
        match self.hear(timeout, phrase_limit).await {
            Ok(Some(utterance)) => {
                tracing::info!(text = %utterance.text, "you said");
                Heard::Utterance(utterance)
            }
            Ok(None) => Heard::Nothing,
            Err(Error::Recognition(reason)) => {
                tracing::info!(reason, "I didn't catch that");
                Heard::Nothing
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition error");
                Heard::Nothing
            }
        }
    }
}

/// Reads one utterance per line, for running without a microphone
pub struct TypedInput<R> {
    lines: tokio::io::Lines<R>,
    prompt: bool,
}

impl TypedInput<BufReader<Stdin>> {
    /// Read from standard input, printing a prompt before each line
    #[must_use]
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            prompt: true,
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send> TypedInput<R> {
    /// Read from any buffered reader without prompting
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            prompt: false,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> SpeechInput for TypedInput<R> {
    async fn listen(&mut self, _timeout: Duration, _phrase_limit: Duration) -> Heard {
        if self.prompt {
            let mut stdout = tokio::io::stdout();
            let _ = stdout.write_all(b"you> ").await;
            let _ = stdout.flush().await;
        }

        match self.lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Heard::Nothing,
            Ok(Some(line)) => Heard::Utterance(Utterance::now(line.trim())),
            Ok(None) => Heard::Closed,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read typed input");
                Heard::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_typed_input_lines() {
        let mut input = TypedInput::new(&b"hello mirror\n\n  exit  \n"[..]);
        let wait = Duration::from_secs(5);

        match input.listen(wait, wait).await {
            Heard::Utterance(u) => assert_eq!(u.text, "hello mirror"),
            other => panic!("expected utterance, got {other:?}"),
        }
        assert_eq!(input.listen(wait, wait).await, Heard::Nothing);
        match input.listen(wait, wait).await {
            Heard::Utterance(u) => assert_eq!(u.text, "exit"),
            other => panic!("expected utterance, got {other:?}"),
        }
        assert_eq!(input.listen(wait, wait).await, Heard::Closed);
    }
}
