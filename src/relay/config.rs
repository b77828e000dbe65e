//! Configuration for the relay service.
//!
//! Command-line arguments are parsed with `arrrg` and resolved into a
//! [`RelayConfig`] with defaults for everything left unset.

use arrrg_derive::CommandLine;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Default upstream API base URL.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/";

/// Model used when web search is off.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Model used when web search is on.
pub const DEFAULT_SEARCH_MODEL: &str = "gpt-4o-mini";

/// Upper bound on web search results per call.
pub const SEARCH_MAX_RESULTS: u32 = 3;

/// Largest request body the relay reads, in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Command-line arguments for the routine-relay service.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct RelayArgs {
    /// Address to listen on.
    #[arrrg(optional, "Listen address (default: 127.0.0.1:8787)", "ADDR")]
    pub bind: Option<String>,

    /// Upstream API base URL.
    #[arrrg(optional, "Upstream API base URL (default: https://api.openai.com/v1/)", "URL")]
    pub upstream_url: Option<String>,

    /// Model used without web search.
    #[arrrg(optional, "Model when web search is off (default: gpt-4o)", "MODEL")]
    pub model: Option<String>,

    /// Model used with web search.
    #[arrrg(optional, "Model when web search is on (default: gpt-4o-mini)", "MODEL")]
    pub search_model: Option<String>,
}

/// Resolved relay configuration.
///
/// The upstream credential is deliberately not part of this struct; it is
/// read from the environment by the upstream client.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Address the service listens on.
    pub bind: String,

    /// Base URL of the upstream API.
    pub upstream_url: String,

    /// Model used when web search is off.
    pub model: String,

    /// Model used when web search is on.
    pub search_model: String,

    /// Sampling temperature sent upstream.
    pub temperature: f32,

    /// Nucleus sampling value sent upstream.
    pub top_p: f32,

    /// Result bound for the web search tool.
    pub search_max_results: u32,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl RelayConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            search_model: DEFAULT_SEARCH_MODEL.to_string(),
            temperature: 0.8,
            top_p: 1.0,
            search_max_results: SEARCH_MAX_RESULTS,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Sets the listen address.
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Sets the upstream base URL.
    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    /// Sets the model used without web search.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the model used with web search.
    pub fn with_search_model(mut self, model: impl Into<String>) -> Self {
        self.search_model = model.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the request body limit.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<RelayArgs> for RelayConfig {
    fn from(args: RelayArgs) -> Self {
        let defaults = RelayConfig::new();
        RelayConfig {
            bind: args.bind.unwrap_or(defaults.bind),
            upstream_url: args.upstream_url.unwrap_or(defaults.upstream_url),
            model: args.model.unwrap_or(defaults.model),
            search_model: args.search_model.unwrap_or(defaults.search_model),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RelayConfig::new();
        assert_eq!(config.bind, "127.0.0.1:8787");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.search_model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.top_p, 1.0);
        assert_eq!(config.search_max_results, 3);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn config_from_args() {
        let config = RelayConfig::from(RelayArgs {
            bind: Some("0.0.0.0:9000".to_string()),
            upstream_url: None,
            model: Some("gpt-4.1".to_string()),
            search_model: None,
        });
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.search_model, DEFAULT_SEARCH_MODEL);
    }

    #[test]
    fn config_builder_pattern() {
        let config = RelayConfig::new()
            .with_bind("127.0.0.1:0")
            .with_upstream_url("http://localhost:1/v1/")
            .with_model("m")
            .with_search_model("s")
            .with_temperature(0.2)
            .with_max_body_bytes(64);
        assert_eq!(config.bind, "127.0.0.1:0");
        assert_eq!(config.upstream_url, "http://localhost:1/v1/");
        assert_eq!(config.model, "m");
        assert_eq!(config.search_model, "s");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_body_bytes, 64);
    }
}
