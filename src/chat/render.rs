//! Output rendering for the routine chat.
//!
//! This module provides a trait-based rendering abstraction over the
//! session's view models. The default implementation writes plain text
//! with optional ANSI styling.

use std::io::{self, Stdout, Write};

use crate::session::{DisplayMessage, ProductCard, SelectedChip, Speaker};

/// ANSI escape code for dim text (used for secondary product details).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the advisor label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for status lines).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for green text (used for selected markers).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Shown when no product matches the filters.
pub const NO_MATCHING_PRODUCTS: &str = "No products match your filters.";

/// Shown when the shortlist is empty.
pub const EMPTY_SHORTLIST: &str = "Select any product to add it to your routine shortlist.";

/// Trait for rendering session views.
pub trait Renderer: Send {
    /// Print the product grid.
    fn print_products(&mut self, cards: &[ProductCard<'_>]);

    /// Print the shortlist.
    fn print_selected(&mut self, chips: &[SelectedChip<'_>]);

    /// Print one chat message.
    fn print_message(&mut self, message: &DisplayMessage);

    /// Print a status line.
    fn print_status(&mut self, status: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the renderer, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_products(&mut self, cards: &[ProductCard<'_>]) {
        if cards.is_empty() {
            self.line(NO_MATCHING_PRODUCTS);
            return;
        }
        for card in cards {
            let marker = if card.selected {
                self.styled(ANSI_GREEN, "[x]")
            } else {
                "[ ]".to_string()
            };
            let details = self.styled(ANSI_DIM, &format!("({})", card.category_label()));
            let text = format!(
                "{marker} #{} {} {} {details}",
                card.product.id, card.product.brand, card.product.name
            );
            self.line(&text);
        }
    }

    fn print_selected(&mut self, chips: &[SelectedChip<'_>]) {
        if chips.is_empty() {
            self.line(EMPTY_SHORTLIST);
            return;
        }
        for chip in chips {
            let subtitle = self.styled(ANSI_DIM, &chip.subtitle());
            let text = format!("  #{} {}  {subtitle}", chip.product.id, chip.product.name);
            self.line(&text);
        }
    }

    fn print_message(&mut self, message: &DisplayMessage) {
        let label = match message.speaker {
            Speaker::Advisor => self.styled(ANSI_CYAN, "L'Oréal Advisor:"),
            Speaker::User => "You:".to_string(),
        };
        let text = format!("{label}\n{}\n", message.text);
        self.line(&text);
    }

    fn print_status(&mut self, status: &str) {
        let text = self.styled(ANSI_YELLOW, status);
        self.line(&text);
    }

    fn print_error(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.line(&text);
    }

    fn print_info(&mut self, info: &str) {
        self.line(info);
    }
}
