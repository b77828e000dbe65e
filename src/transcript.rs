//! The conversation history sent to the relay.

use crate::types::{ChatMessage, ChatRole};

/// Advisor persona that opens every transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly L'Oréal beauty advisor. Recommend routines using the selected products and keep the conversation focused on beauty care topics.";

/// An ordered chat transcript whose first entry is always the system message.
///
/// The system message is fixed at construction and survives every reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    /// Creates a transcript holding only `system_prompt`.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    /// Truncates back to the system message.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    /// Appends a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Appends an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// The system prompt.
    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    /// All messages, system message first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages, including the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the system message is never removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if an assistant message follows the system message.
    pub fn has_assistant_reply(&self) -> bool {
        self.messages[1..]
            .iter()
            .any(|m| m.role == ChatRole::Assistant)
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}
