//! Configuration types for the routine chat.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for wiring up the catalog, store, and relay.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::catalog::{CatalogProvider, FileCatalog, HttpCatalog};
use crate::error::Result;
use crate::transcript::DEFAULT_SYSTEM_PROMPT;

/// Catalog file read when none is given.
pub const DEFAULT_CATALOG: &str = "products.json";

/// Store file name under the user's home directory.
const STORE_DIR: &str = ".routine-builder";
const STORE_FILE: &str = "store.json";

/// Command-line arguments for the routine-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// URL of a running relay.
    #[arrrg(optional, "Relay URL (default: call the upstream in-process)", "URL")]
    pub relay_url: Option<String>,

    /// Catalog path or URL.
    #[arrrg(optional, "Catalog file or http(s) URL (default: products.json)", "CATALOG")]
    pub catalog: Option<String>,

    /// Where selections are persisted.
    #[arrrg(optional, "Store file (default: ~/.routine-builder/store.json)", "PATH")]
    pub store: Option<String>,

    /// System prompt override.
    #[arrrg(optional, "System prompt for the advisor", "PROMPT")]
    pub system: Option<String>,

    /// Start with web search on.
    #[arrrg(flag, "Let the advisor search the web")]
    pub web_search: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Where the product catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A local JSON file.
    File(PathBuf),
    /// A URL fetched with GET.
    Url(String),
}

impl CatalogSource {
    /// Interprets `value` as a URL if it has an http(s) scheme, else as a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            CatalogSource::Url(value.to_string())
        } else {
            CatalogSource::File(PathBuf::from(value))
        }
    }

    /// Builds the provider for this source.
    pub fn provider(&self) -> Result<Box<dyn CatalogProvider>> {
        let provider: Box<dyn CatalogProvider> = match self {
            CatalogSource::File(path) => Box::new(FileCatalog::new(path.clone())),
            CatalogSource::Url(url) => Box::new(HttpCatalog::new(url)?),
        };
        Ok(provider)
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::File(PathBuf::from(DEFAULT_CATALOG))
    }
}

/// Configuration for a routine chat.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Relay URL; `None` means relay in-process or not at all.
    pub relay_url: Option<String>,

    /// Where products are loaded from.
    pub catalog: CatalogSource,

    /// Where selections are persisted.
    pub store_path: PathBuf,

    /// System prompt fixed for the life of the session.
    pub system_prompt: String,

    /// Whether web search starts enabled.
    pub web_search: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    pub fn new() -> Self {
        Self {
            relay_url: None,
            catalog: CatalogSource::default(),
            store_path: default_store_path(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            web_search: false,
            use_color: true,
        }
    }

    /// Sets the relay URL.
    pub fn with_relay_url(mut self, url: impl Into<String>) -> Self {
        self.relay_url = Some(url.into());
        self
    }

    /// Sets the catalog source.
    pub fn with_catalog(mut self, catalog: CatalogSource) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the store path.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets whether web search starts enabled.
    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            relay_url: args.relay_url.filter(|s| !s.trim().is_empty()),
            catalog: args
                .catalog
                .as_deref()
                .map(CatalogSource::parse)
                .unwrap_or(defaults.catalog),
            store_path: args.store.map(PathBuf::from).unwrap_or(defaults.store_path),
            system_prompt: args.system.unwrap_or(defaults.system_prompt),
            web_search: args.web_search,
            use_color: !args.no_color,
        }
    }
}

fn default_store_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(STORE_DIR).join(STORE_FILE),
        _ => PathBuf::from(STORE_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.relay_url.is_none());
        assert_eq!(config.catalog, CatalogSource::File(PathBuf::from("products.json")));
        assert!(config.store_path.ends_with("store.json"));
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(!config.web_search);
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            relay_url: Some("http://127.0.0.1:8787/".to_string()),
            catalog: Some("https://example.com/products.json".to_string()),
            store: Some("/tmp/selection.json".to_string()),
            system: Some("Be brief.".to_string()),
            web_search: true,
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.relay_url.as_deref(), Some("http://127.0.0.1:8787/"));
        assert_eq!(
            config.catalog,
            CatalogSource::Url("https://example.com/products.json".to_string())
        );
        assert_eq!(config.store_path, PathBuf::from("/tmp/selection.json"));
        assert_eq!(config.system_prompt, "Be brief.");
        assert!(config.web_search);
        assert!(!config.use_color);
    }

    #[test]
    fn blank_relay_url_is_unset() {
        let args = ChatArgs {
            relay_url: Some("  ".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::from(args).relay_url.is_none());
    }

    #[test]
    fn catalog_source_parsing() {
        assert_eq!(
            CatalogSource::parse("data/products.json"),
            CatalogSource::File(PathBuf::from("data/products.json"))
        );
        assert_eq!(
            CatalogSource::parse("http://localhost/products.json"),
            CatalogSource::Url("http://localhost/products.json".to_string())
        );
        assert!(CatalogSource::parse("http://").provider().is_err());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_relay_url("http://relay.local/")
            .with_catalog(CatalogSource::Url("http://catalog.local/".to_string()))
            .with_store_path("store.json")
            .with_system_prompt("Test prompt")
            .with_web_search(true)
            .without_color();
        assert_eq!(config.relay_url.as_deref(), Some("http://relay.local/"));
        assert_eq!(config.store_path, PathBuf::from("store.json"));
        assert_eq!(config.system_prompt, "Test prompt");
        assert!(config.web_search);
        assert!(!config.use_color);
    }
}
