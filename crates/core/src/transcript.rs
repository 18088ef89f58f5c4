//! In-memory chat transcript for one conversation session.
//!
//! The transcript is the session's source of truth for display. It is never
//! persisted as a whole; each completed turn is recorded separately as a
//! status update.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Number of trailing transcript entries rendered into a generation prompt.
pub const CONTEXT_WINDOW: usize = 6;

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the contractor.
    User,
    /// Text produced by the text-generation collaborator (or a fixed fallback).
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: Timestamp,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::at(Role::User, content, Utc::now())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::at(Role::Assistant, content, Utc::now())
    }

    /// Build an entry with an explicit timestamp (used when replaying history).
    pub fn at(role: Role, content: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Ordered sequence of messages. Insertion order is conversation order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry after every existing one.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The trailing [`CONTEXT_WINDOW`] entries, oldest first.
    pub fn context_window(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_of(n: usize) -> Transcript {
        let mut t = Transcript::new();
        for i in 0..n {
            let msg = if i % 2 == 0 {
                Message::user(format!("entry {i}"))
            } else {
                Message::assistant(format!("entry {i}"))
            };
            t.push(msg);
        }
        t
    }

    #[test]
    fn window_of_short_transcript_is_everything() {
        let t = transcript_of(3);
        assert_eq!(t.context_window().len(), 3);
        assert_eq!(t.context_window()[0].content, "entry 0");
    }

    #[test]
    fn window_keeps_only_trailing_entries() {
        let t = transcript_of(20);
        let window = t.context_window();
        assert_eq!(window.len(), CONTEXT_WINDOW);
        assert_eq!(window[0].content, "entry 14");
        assert_eq!(window[5].content, "entry 19");
    }

    #[test]
    fn empty_transcript_has_empty_window() {
        let t = Transcript::new();
        assert!(t.context_window().is_empty());
        assert!(t.last().is_none());
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
