//! Slash command parsing for the routine chat.
//!
//! Input starting with `/` drives the product grid and the shortlist;
//! anything else is a follow-up question for the advisor.

use crate::types::ProductId;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show the product grid under the current filters.
    Products,

    /// List the categories available for filtering.
    Categories,

    /// Filter by an exact category. `None` shows every category.
    Category(Option<String>),

    /// Filter by a search term over brand and name. `None` clears it.
    Search(Option<String>),

    /// Select or deselect a product.
    Toggle(ProductId),

    /// Remove a product from the shortlist.
    Remove(ProductId),

    /// Empty the shortlist.
    ClearSelection,

    /// Show the shortlist.
    Selected,

    /// Ask the advisor for a routine over the shortlist.
    Routine,

    /// Turn web search on or off.
    WebSearch(bool),

    /// Show the conversation so far.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command,
/// or `None` if it should be sent as a follow-up question.
///
/// # Examples
///
/// ```
/// # use routine_builder::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/select 3"), Some(ChatCommand::Toggle(3)));
/// assert!(parse_command("Is this safe for sensitive skin?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "products" | "ls" => ChatCommand::Products,
        "categories" => ChatCommand::Categories,
        "category" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("all") => ChatCommand::Category(None),
            Some(arg) => ChatCommand::Category(Some(arg.to_lowercase())),
            None => ChatCommand::Category(None),
        },
        "search" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::Search(None),
            other => ChatCommand::Search(other.map(str::to_string)),
        },
        "select" | "toggle" => parse_id_command(argument, ChatCommand::Toggle, "/select"),
        "remove" => parse_id_command(argument, ChatCommand::Remove, "/remove"),
        "clear" => ChatCommand::ClearSelection,
        "selected" | "shortlist" => ChatCommand::Selected,
        "routine" | "generate" => ChatCommand::Routine,
        "websearch" | "web" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::WebSearch(value),
            None => ChatCommand::Invalid("/websearch expects 'on' or 'off'".to_string()),
        },
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_id_command<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(ProductId) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.trim_start_matches('#').parse::<ProductId>() {
            Ok(id) => constructor(id),
            Err(_) => ChatCommand::Invalid(format!("{name} expects a product id")),
        },
        None => ChatCommand::Invalid(format!("{name} requires a product id")),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /products              Show products under the current filters
  /categories            List product categories
  /category <name|all>   Filter by category
  /search <term|clear>   Filter by brand or product name
  /select <id>           Add or remove a product from your shortlist
  /remove <id>           Remove a product from your shortlist
  /selected              Show your shortlist
  /clear                 Empty your shortlist
  /routine               Generate a routine from your shortlist
  /websearch on|off      Let the advisor search the web
  /history               Show the conversation so far
  /help                  Show this help message
  /quit                  Exit the chat
Anything else is sent to the advisor as a follow-up question."#
}
