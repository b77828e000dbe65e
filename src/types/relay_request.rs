use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Body the client posts to the relay.
///
/// `messages` defaults to empty so that a body without it still parses and
/// can be rejected with a specific message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayRequest {
    /// The full transcript, system message first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Whether the upstream call should enable web search.
    #[serde(rename = "webSearch", default)]
    pub web_search: bool,
}

impl RelayRequest {
    /// Create a new relay request.
    pub fn new(messages: Vec<ChatMessage>, web_search: bool) -> Self {
        Self {
            messages,
            web_search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn web_search_is_optional() {
        let request: RelayRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();
        assert!(!request.web_search);
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn web_search_uses_camel_case_on_the_wire() {
        let request = RelayRequest::new(vec![ChatMessage::user("hi")], true);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["webSearch"], json!(true));
    }
}
