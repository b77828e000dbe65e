use serde::{Deserialize, Serialize};

/// Role of a transcript entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The advisor persona that seeds every transcript.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: ChatRole,

    /// The text of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage` with the given role and content.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::system("Be kind.");
        assert_eq!(
            to_value(&message).unwrap(),
            json!({"role": "system", "content": "Be kind."})
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<ChatMessage>(json!({
            "role": "tool",
            "content": "x"
        }));
        assert!(parsed.is_err());
    }
}
