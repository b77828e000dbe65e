//! The chat relay.
//!
//! The relay is a stateless translator: it takes a client transcript and a
//! web-search flag, builds one upstream chat-completion request, and hands
//! the upstream body back untouched. It holds the upstream credential so
//! the client never has to.
//!
//! - [`config`]: command-line arguments and resolved settings
//! - [`upstream`]: the provider seam and its HTTP implementation
//! - [`server`]: the HTTP entry point

mod config;
mod server;
mod upstream;

use std::sync::Arc;
use std::time::Instant;

pub use config::{
    DEFAULT_BIND, DEFAULT_MODEL, DEFAULT_SEARCH_MODEL, DEFAULT_UPSTREAM_URL, MAX_BODY_BYTES,
    RelayArgs, RelayConfig, SEARCH_MAX_RESULTS,
};
pub use server::{parse_relay_request, router};
pub use upstream::{OpenAi, Upstream};

use crate::error::{Error, Result};
use crate::observability::{
    RELAY_DURATION, RELAY_INVALID_REQUESTS, RELAY_REQUESTS, RELAY_TRANSPORT_ERRORS,
    RELAY_UPSTREAM_ERRORS,
};
use crate::relay_logger::RelayLogger;
use crate::types::{ChatCompletionRequest, ChatMessage, UpstreamTool};

/// Translates client transcripts into upstream chat-completion calls.
pub struct Relay<U: Upstream> {
    upstream: U,
    config: RelayConfig,
    logger: Option<Arc<dyn RelayLogger>>,
}

impl<U: Upstream> Relay<U> {
    /// Creates a relay forwarding to `upstream`.
    pub fn new(upstream: U, config: RelayConfig) -> Self {
        Self {
            upstream,
            config,
            logger: None,
        }
    }

    /// Attaches a logger that sees every upstream request and outcome.
    pub fn with_logger(mut self, logger: Arc<dyn RelayLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The relay's configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The upstream this relay forwards to.
    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Builds the upstream request for a transcript.
    ///
    /// Web search switches to the search model and adds the search tool;
    /// without it the tool list is omitted entirely.
    pub fn completion_request(
        &self,
        messages: &[ChatMessage],
        use_extended_search: bool,
    ) -> ChatCompletionRequest {
        let (model, tools) = if use_extended_search {
            (
                self.config.search_model.clone(),
                Some(vec![UpstreamTool::web_search(
                    self.config.search_max_results,
                )]),
            )
        } else {
            (self.config.model.clone(), None)
        };
        ChatCompletionRequest {
            model,
            messages: messages.to_vec(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            tools,
        }
    }

    /// Forwards a transcript upstream and returns the upstream body verbatim.
    ///
    /// Exactly one upstream call is made; nothing is retried or cached.
    pub async fn relay(&self, messages: &[ChatMessage], use_extended_search: bool) -> Result<String> {
        if messages.is_empty() {
            RELAY_INVALID_REQUESTS.click();
            return Err(Error::invalid_request(
                "Include a messages array in the request body",
            ));
        }

        let request = self.completion_request(messages, use_extended_search);
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        RELAY_REQUESTS.click();
        let start = Instant::now();
        let result = self
            .upstream
            .complete(&request)
            .await
            .and_then(ensure_json);
        RELAY_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(body) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(body);
                }
            }
            Err(err) => {
                if err.is_upstream() {
                    RELAY_UPSTREAM_ERRORS.click();
                } else {
                    RELAY_TRANSPORT_ERRORS.click();
                }
                if let Some(logger) = &self.logger {
                    logger.log_error(err);
                }
            }
        }
        result
    }
}

/// A success body that is not JSON is treated like an unreachable upstream.
fn ensure_json(body: String) -> Result<String> {
    match serde_json::from_str::<serde::de::IgnoredAny>(&body) {
        Ok(_) => Ok(body),
        Err(e) => Err(Error::transport(
            format!("upstream returned malformed JSON: {e}"),
            Some(Box::new(e)),
        )),
    }
}
