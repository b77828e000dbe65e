//! Interactive routine builder for the terminal.
//!
//! This module provides the pieces of the `routine-chat` REPL:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing
//! - [`render`]: Plain-text rendering of the session's views

mod commands;
mod config;
mod render;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{CatalogSource, ChatArgs, ChatConfig, DEFAULT_CATALOG};
pub use render::{EMPTY_SHORTLIST, NO_MATCHING_PRODUCTS, PlainTextRenderer, Renderer};
