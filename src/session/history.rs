//! In-memory conversation history with a sliding request window

use serde::{Deserialize, Serialize};

/// Number of history entries forwarded with each chat request
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Every user/assistant exchange of the session, oldest first
///
/// Entries are only added in complete pairs, so a failed turn leaves the
/// history exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    entries: Vec<ChatMessage>,
}

impl ConversationHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one completed exchange
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.entries.push(user);
        self.entries.push(assistant);
    }

    /// The most recent `size` entries, oldest first
    #[must_use]
    pub fn window(&self, size: usize) -> &[ChatMessage] {
        let start = self.entries.len().saturating_sub(size);
        &self.entries[start..]
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
