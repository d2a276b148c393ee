//! Keyword intent classification

/// Default phrases that end the session
pub const DEFAULT_EXIT_KEYWORDS: &[&str] = &["exit", "quit", "goodbye", "stop"];

/// Default phrases that ask the mirror to look at the user
pub const DEFAULT_VISION_KEYWORDS: &[&str] = &[
    "take photo",
    "look at me",
    "what do you think",
    "what do you see",
    "how do i look",
    "how am i looking",
    "how i look",
    "what do you think of me",
    "how do i look today",
    "analyze me",
    "look at",
];

/// Default trigger phrase stripped from utterances
pub const DEFAULT_WAKE_PHRASE: &str = "mirror mirror";

/// Routing decision for one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// End the session
    Exit,
    /// Capture a frame and describe the user
    Vision,
    /// Plain conversation
    Chat,
}

/// Keyword sets the classifier matches against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    pub exit: Vec<String>,
    pub vision: Vec<String>,
    pub wake_phrase: Option<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            exit: DEFAULT_EXIT_KEYWORDS.iter().map(ToString::to_string).collect(),
            vision: DEFAULT_VISION_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            wake_phrase: Some(DEFAULT_WAKE_PHRASE.to_string()),
        }
    }
}

/// Classifies utterances by substring keyword matching
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    exit: Vec<String>,
    vision: Vec<String>,
    wake_phrase: Option<String>,
}

impl IntentClassifier {
    /// Create a classifier; keywords are lowercased and trimmed, blanks dropped
    #[must_use]
    pub fn new(keywords: Keywords) -> Self {
        let normalize = |words: Vec<String>| -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        let wake_phrase = keywords
            .wake_phrase
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty());

        tracing::debug!(
            exit = ?keywords.exit,
            wake_phrase = ?wake_phrase,
            vision_keywords = keywords.vision.len(),
            "intent classifier initialized"
        );

        Self {
            exit: normalize(keywords.exit),
            vision: normalize(keywords.vision),
            wake_phrase,
        }
    }

    /// Classify an utterance. Exit wins over vision, vision over chat.
    #[must_use]
    pub fn classify(&self, utterance: &str) -> Intent {
        let normalized = utterance.to_lowercase();

        if self.exit.iter().any(|k| normalized.contains(k.as_str())) {
            Intent::Exit
        } else if self.vision.iter().any(|k| normalized.contains(k.as_str())) {
            Intent::Vision
        } else {
            Intent::Chat
        }
    }

    /// Remove the wake phrase from an utterance
    ///
    /// Stripping never gates processing: text without the phrase passes
    /// through unchanged.
    #[must_use]
    pub fn strip_wake_phrase(&self, utterance: &str) -> String {
        match &self.wake_phrase {
            Some(phrase) if utterance.contains(phrase.as_str()) => {
                utterance.replace(phrase.as_str(), "").trim().to_string()
            }
            _ => utterance.to_string(),
        }
    }

    /// The configured wake phrase, if any
    #[must_use]
    pub fn wake_phrase(&self) -> Option<&str> {
        self.wake_phrase.as_deref()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(Keywords::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_has_priority() {
        let classifier = IntentClassifier::default();

        assert_eq!(classifier.classify("exit"), Intent::Exit);
        assert_eq!(classifier.classify("look at me and then quit"), Intent::Exit);
        assert_eq!(classifier.classify("Goodbye mirror"), Intent::Exit);
    }

    #[test]
    fn test_vision_keywords() {
        let classifier = IntentClassifier::default();

        assert_eq!(classifier.classify("what do you think of me"), Intent::Vision);
        assert_eq!(classifier.classify("How do I look today?"), Intent::Vision);
        assert_eq!(classifier.classify("please take photo"), Intent::Vision);
        assert_eq!(classifier.classify("look at this outfit"), Intent::Vision);
    }

    #[test]
    fn test_everything_else_is_chat() {
        let classifier = IntentClassifier::default();

        assert_eq!(classifier.classify("tell me a story"), Intent::Chat);
        assert_eq!(classifier.classify(""), Intent::Chat);
    }

    #[test]
    fn test_keywords_are_normalized() {
        let classifier = IntentClassifier::new(Keywords {
            exit: vec!["  BYE ".to_string(), "   ".to_string()],
            vision: vec!["Mirror Me".to_string()],
            wake_phrase: Some("  ".to_string()),
        });

        assert_eq!(classifier.classify("ok bye"), Intent::Exit);
        assert_eq!(classifier.classify("mirror me now"), Intent::Vision);
        // blank keyword must not match everything
        assert_eq!(classifier.classify("hello"), Intent::Chat);
        assert!(classifier.wake_phrase().is_none());
    }

    #[test]
    fn test_wake_phrase_is_pass_through() {
        let classifier = IntentClassifier::default();

        assert_eq!(
            classifier.strip_wake_phrase("mirror mirror tell me a joke"),
            "tell me a joke"
        );
        assert_eq!(classifier.strip_wake_phrase("tell me a joke"), "tell me a joke");
        assert_eq!(classifier.strip_wake_phrase("mirror mirror"), "");
    }
}
