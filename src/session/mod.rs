//! Session orchestration
//!
//! A [`Session`] runs the mirror's turn loop: listen, classify, dispatch to
//! the vision or chat path, speak the result. Turns run strictly one after
//! another. No turn failure ends the session; only an exit phrase (or an
//! input source that has closed) does.

mod history;
mod intent;

use std::time::Duration;

pub use history::{ChatMessage, ConversationHistory, DEFAULT_HISTORY_WINDOW, Role};
pub use intent::{
    DEFAULT_EXIT_KEYWORDS, DEFAULT_VISION_KEYWORDS, DEFAULT_WAKE_PHRASE, Intent,
    IntentClassifier, Keywords,
};

use crate::Result;
use crate::adapter::{ChatCompleter, Heard, SpeechInput, SpeechOutput, VisionAnalyzer};
use crate::persona::Persona;

/// Tunables of the turn loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// History entries forwarded with each chat request
    pub history_window: usize,
    /// How long to wait for speech to start
    pub listen_timeout: Duration,
    /// Longest phrase recorded per turn
    pub phrase_limit: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            listen_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(10),
        }
    }
}

/// What happened in one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing was heard
    Skipped,
    /// Farewell spoken; the session is over
    Exit,
    /// The input source has ended
    Closed,
    Vision(VisionOutcome),
    Chat(ChatOutcome),
}

impl TurnOutcome {
    /// Whether the loop should stop after this turn
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Exit | Self::Closed)
    }
}

/// Result of the vision path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionOutcome {
    Described,
    CameraFailed,
    AnalysisFailed,
}

/// Result of the chat path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    Replied,
    NoResponse,
}

/// The conversation between one person and the mirror
pub struct Session<I, V, C, S> {
    input: I,
    vision: V,
    chat: C,
    speech: S,
    classifier: IntentClassifier,
    persona: Persona,
    options: SessionOptions,
    history: ConversationHistory,
}

impl<I, V, C, S> Session<I, V, C, S>
where
    I: SpeechInput,
    V: VisionAnalyzer,
    C: ChatCompleter,
    S: SpeechOutput,
{
    /// Assemble a session from its adapters
    #[must_use]
    pub fn new(
        input: I,
        vision: V,
        chat: C,
        speech: S,
        classifier: IntentClassifier,
        persona: Persona,
        options: SessionOptions,
    ) -> Self {
        Self {
            input,
            vision,
            chat,
            speech,
            classifier,
            persona,
            options,
            history: ConversationHistory::new(),
        }
    }

    /// Greet, then take turns until an exit phrase is heard
    ///
    /// Returns the number of turns in which something was heard.
    pub async fn run(&mut self) -> usize {
        tracing::info!(persona = %self.persona.name, "session started");
        self.speech.speak(&self.persona.greeting).await;

        let mut turns = 0;
        loop {
            let outcome = self.run_turn().await;
            if outcome != TurnOutcome::Skipped {
                turns += 1;
            }
            tracing::debug!(?outcome, turns, "turn finished");

            if outcome.is_final() {
                break;
            }
        }

        tracing::info!(turns, history = self.history.len(), "session ended");
        turns
    }

    /// Listen once and handle whatever was said
    pub async fn run_turn(&mut self) -> TurnOutcome {
        let heard = self
            .input
            .listen(self.options.listen_timeout, self.options.phrase_limit)
            .await;

        let utterance = match heard {
            Heard::Utterance(utterance) => utterance,
            Heard::Nothing => return TurnOutcome::Skipped,
            Heard::Closed => return TurnOutcome::Closed,
        };

        let text = utterance.text.trim().to_lowercase();
        if text.is_empty() {
            return TurnOutcome::Skipped;
        }

        if self.classifier.classify(&text) == Intent::Exit {
            return self.farewell(&text).await;
        }

        // Pass-through: a bare wake phrase is sent on as said
        let stripped = self.classifier.strip_wake_phrase(&text);
        let text = if stripped.is_empty() { text } else { stripped };

        match self.classifier.classify(&text) {
            Intent::Vision => TurnOutcome::Vision(self.look(&text).await),
            Intent::Chat => TurnOutcome::Chat(self.ask(&text).await),
            // Only reachable when removing the wake phrase joins an exit word
            Intent::Exit => self.farewell(&text).await,
        }
    }

    async fn farewell(&self, utterance: &str) -> TurnOutcome {
        tracing::info!(utterance, "exit requested");
        self.speech.speak(&self.persona.farewell).await;
        TurnOutcome::Exit
    }

    /// Vision path: look at the person and speak what the mirror sees
    ///
    /// The description is not added to the conversation history.
    pub async fn look(&mut self, request: &str) -> VisionOutcome {
        tracing::info!(request, "vision turn");
        self.speech.speak(&self.persona.look_filler).await;

        let frame = match self.vision.capture().await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "camera capture failed");
                self.speech.speak(&self.persona.camera_apology).await;
                return VisionOutcome::CameraFailed;
            }
        };

        let prompt = self.persona.vision_request(request);
        match self.vision.describe(&frame, &prompt).await {
            Ok(description) if !description.trim().is_empty() => {
                self.speech.speak(&description).await;
                VisionOutcome::Described
            }
            Ok(_) => {
                tracing::warn!("vision model returned an empty description");
                self.speech.speak(&self.persona.analysis_apology).await;
                VisionOutcome::AnalysisFailed
            }
            Err(e) => {
                tracing::warn!(error = %e, "image analysis failed");
                self.speech.speak(&self.persona.analysis_apology).await;
                VisionOutcome::AnalysisFailed
            }
        }
    }

    /// Chat path: ask the language model and speak its reply
    pub async fn ask(&mut self, query: &str) -> ChatOutcome {
        self.ask_with_context(query, None).await
    }

    /// Chat path with an optional description of what the camera sees
    ///
    /// History gains the user entry and the reply only when a non-empty
    /// reply arrives.
    pub async fn ask_with_context(&mut self, query: &str, visual: Option<&str>) -> ChatOutcome {
        tracing::info!(query, has_visual = visual.is_some(), "chat turn");

        let user = ChatMessage::user(compose_user_message(query, visual));
        let messages = self.request_messages(&user);

        match self.chat.complete(&messages).await {
            Ok(reply) if !reply.trim().is_empty() => {
                let reply = reply.trim().to_string();
                self.history
                    .record_exchange(user, ChatMessage::assistant(reply.clone()));
                self.speech.speak(&reply).await;
                ChatOutcome::Replied
            }
            Ok(_) => {
                tracing::warn!("no response from chat service (empty reply)");
                self.speech.speak(&self.persona.chat_apology).await;
                ChatOutcome::NoResponse
            }
            Err(e) => {
                tracing::warn!(error = %e, "no response from chat service");
                self.speech.speak(&self.persona.chat_apology).await;
                ChatOutcome::NoResponse
            }
        }
    }

    /// Capture a frame and describe it without speaking
    ///
    /// # Errors
    ///
    /// Returns error if capture or analysis fails
    pub async fn observe(&self, prompt: &str) -> Result<String> {
        let frame = self.vision.capture().await?;
        self.vision.describe(&frame, prompt).await
    }

    /// Messages for a chat request: persona, recent history, the new entry
    #[must_use]
    pub fn request_messages(&self, user: &ChatMessage) -> Vec<ChatMessage> {
        let window = self.history.window(self.options.history_window);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(self.persona.system_prompt.clone()));
        messages.extend_from_slice(window);
        messages.push(user.clone());
        messages
    }

    #[must_use]
    pub const fn history(&self) -> &ConversationHistory {
        &self.history
    }

    #[must_use]
    pub const fn persona(&self) -> &Persona {
        &self.persona
    }

    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

/// Build the user entry, annotated with visual context when present
#[must_use]
pub fn compose_user_message(query: &str, visual: Option<&str>) -> String {
    match visual.map(str::trim) {
        Some(context) if !context.is_empty() => {
            format!("{query}\n\n[VISUAL INPUT: {context}]")
        }
        _ => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_user_message() {
        assert_eq!(compose_user_message("hello", None), "hello");
        assert_eq!(compose_user_message("hello", Some("  ")), "hello");
        assert_eq!(
            compose_user_message("do I look tired?", Some("a person in a red scarf")),
            "do I look tired?\n\n[VISUAL INPUT: a person in a red scarf]"
        );
    }

    #[test]
    fn test_final_outcomes() {
        assert!(TurnOutcome::Exit.is_final());
        assert!(TurnOutcome::Closed.is_final());
        assert!(!TurnOutcome::Skipped.is_final());
        assert!(!TurnOutcome::Chat(ChatOutcome::NoResponse).is_final());
    }
}
