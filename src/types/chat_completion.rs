use serde::Deserialize;

/// The slice of an upstream chat-completion response the client reads.
///
/// Everything but the first choice's message content is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChatCompletion {
    /// Completion choices, best first.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One completion choice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Choice {
    /// The generated message, if any.
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

/// The generated message within a choice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChoiceMessage {
    /// Generated text; may be null when the model produced none.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Returns the trimmed text of the first choice, if it has any.
    pub fn reply_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
