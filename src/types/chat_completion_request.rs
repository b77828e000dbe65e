use serde::{Deserialize, Serialize};

use crate::types::ChatMessage;

/// Request body sent to the upstream chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// Upstream model name.
    pub model: String,

    /// The transcript, forwarded unchanged.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling value.
    pub top_p: f32,

    /// Auxiliary tools; omitted entirely when none are enabled.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tools: Option<Vec<UpstreamTool>>,
}

/// An auxiliary capability enabled on the upstream call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamTool {
    /// Web search with a bounded number of results.
    WebSearch {
        /// Search options.
        web_search: WebSearchOptions,
    },
}

impl UpstreamTool {
    /// Create a web search tool returning at most `max_results` results.
    pub fn web_search(max_results: u32) -> Self {
        UpstreamTool::WebSearch {
            web_search: WebSearchOptions { max_results },
        }
    }
}

/// Options for the web search tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebSearchOptions {
    /// Upper bound on returned search results.
    pub max_results: u32,
}
