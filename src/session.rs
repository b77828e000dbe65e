//! Session state and the pure transitions over it.
//!
//! Every user action is a method on [`Session`] that updates the state and
//! returns the effects the caller must carry out. Selection changes return
//! [`LocalEffect`]s (persist, re-render); conversation steps return
//! [`Effect`]s, which may also call the relay. Nothing here performs I/O;
//! [`crate::SessionManager`] executes the effects.

use crate::catalog::{Catalog, CatalogFilter, Filtered, format_category};
use crate::error::{Error, Result};
use crate::selection::SelectionSet;
use crate::transcript::ChatTranscript;
use crate::types::{ChatCompletion, Product, ProductId, RelayRequest};

/// Greeting shown at the top of every fresh chat view.
pub const WELCOME_MESSAGE: &str = "Hello! Select a few L'Oréal favorites, then generate a routine to see a personalized plan.";

/// Work requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the selection (in order) to the persistence store.
    Persist(Vec<ProductId>),
    /// Refresh every view derived from the session.
    Render,
    /// Send the request to the chat relay and feed the reply back through
    /// [`Session::apply_reply`].
    CallRelay(RelayRequest),
}

/// Work requested by a selection change. Selection changes never reach the
/// relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEffect {
    /// Write the selection (in order) to the persistence store.
    Persist(Vec<ProductId>),
    /// Refresh every view derived from the session.
    Render,
}

/// Who a displayed chat message is attributed to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Speaker {
    /// The AI advisor.
    Advisor,
    /// The person using the session.
    User,
}

/// A message as shown in the chat window.
///
/// This differs from the transcript: a routine request is displayed as a
/// short product summary while the advisor receives the full prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Who said it.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
}

impl DisplayMessage {
    fn advisor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Advisor,
            text: text.into(),
        }
    }

    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }
}

/// A catalog product as shown in the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductCard<'a> {
    /// The product.
    pub product: &'a Product,
    /// Whether the product is in the selection.
    pub selected: bool,
}

impl ProductCard<'_> {
    /// Display form of the product's category.
    pub fn category_label(&self) -> String {
        format_category(&self.product.category)
    }
}

/// A selected product as shown in the shortlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedChip<'a> {
    /// The product.
    pub product: &'a Product,
}

impl SelectedChip<'_> {
    /// Secondary line: `brand • Category`.
    pub fn subtitle(&self) -> String {
        format!(
            "{} • {}",
            self.product.brand,
            format_category(&self.product.category)
        )
    }
}

/// Product cards for a filter, lazily derived.
#[derive(Debug, Clone)]
pub struct ProductCards<'a> {
    filtered: Filtered<'a>,
    selection: &'a SelectionSet,
}

impl<'a> Iterator for ProductCards<'a> {
    type Item = ProductCard<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let product = self.filtered.next()?;
        Some(ProductCard {
            product,
            selected: self.selection.contains(product.id),
        })
    }
}

/// All state of one product-selection and advisor session.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    selection: SelectionSet,
    transcript: ChatTranscript,
    routine_active: bool,
    web_search: bool,
    chat_view: Vec<DisplayMessage>,
}

impl Session {
    /// Creates a session over `catalog` with the default advisor persona.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_transcript(catalog, ChatTranscript::default())
    }

    /// Creates a session whose transcript starts with `system_prompt`.
    pub fn with_system_prompt(catalog: Catalog, system_prompt: impl Into<String>) -> Self {
        Self::with_transcript(catalog, ChatTranscript::new(system_prompt))
    }

    fn with_transcript(catalog: Catalog, transcript: ChatTranscript) -> Self {
        Self {
            catalog,
            selection: SelectionSet::new(),
            transcript,
            routine_active: false,
            web_search: false,
            chat_view: vec![DisplayMessage::advisor(WELCOME_MESSAGE)],
        }
    }

    /// Replaces the selection with previously persisted ids.
    ///
    /// Ids that are not in the catalog are dropped.
    pub fn restore_selection(&mut self, ids: &[ProductId]) -> Vec<LocalEffect> {
        let known = ids.iter().copied().filter(|id| self.catalog.contains(*id));
        self.selection = SelectionSet::from_ids(known);
        if self.selection.len() != ids.len() {
            tracing::debug!(
                saved = ids.len(),
                kept = self.selection.len(),
                "dropped saved selections missing from the catalog"
            );
        }
        vec![LocalEffect::Render]
    }

    /// Adds the product if unselected, removes it if selected.
    pub fn toggle_selection(&mut self, id: ProductId) -> Result<Vec<LocalEffect>> {
        if !self.catalog.contains(id) {
            return Err(Error::unknown_product(id));
        }
        self.selection.toggle(id);
        Ok(self.selection_changed())
    }

    /// Removes the product from the shortlist.
    pub fn remove_selection(&mut self, id: ProductId) -> Vec<LocalEffect> {
        self.selection.remove(id);
        self.selection_changed()
    }

    /// Empties the shortlist.
    pub fn clear_selection(&mut self) -> Vec<LocalEffect> {
        self.selection.clear();
        self.selection_changed()
    }

    fn selection_changed(&self) -> Vec<LocalEffect> {
        vec![
            LocalEffect::Persist(self.selection.ids().to_vec()),
            LocalEffect::Render,
        ]
    }

    /// Turns web search on or off for later relay calls.
    pub fn set_web_search(&mut self, enabled: bool) {
        self.web_search = enabled;
    }

    /// Starts a routine: resets the conversation and asks for a routine
    /// covering the selection.
    pub fn begin_routine(&mut self) -> Result<Vec<Effect>> {
        if self.selection.is_empty() {
            return Err(Error::EmptySelection);
        }
        let products: Vec<&Product> = self.selected_products().collect();
        let summary = routine_summary(&products);
        let prompt = routine_prompt(&products);

        self.transcript.reset();
        self.routine_active = false;
        debug_assert!(!self.transcript.has_assistant_reply());
        self.chat_view = vec![
            DisplayMessage::advisor(WELCOME_MESSAGE),
            DisplayMessage::user(summary),
        ];
        self.transcript.push_user(prompt);
        Ok(vec![Effect::Render, Effect::CallRelay(self.relay_request())])
    }

    /// Asks a follow-up question about the current routine.
    ///
    /// A blank message is ignored and yields no effects.
    pub fn begin_follow_up(&mut self, message: &str) -> Result<Vec<Effect>> {
        if !self.routine_active {
            return Err(Error::NoActiveRoutine);
        }
        let message = message.trim();
        if message.is_empty() {
            return Ok(Vec::new());
        }
        self.chat_view.push(DisplayMessage::user(message));
        self.transcript.push_user(message);
        Ok(vec![Effect::Render, Effect::CallRelay(self.relay_request())])
    }

    /// Applies a relay response body, returning the reply text.
    ///
    /// On error the session is left untouched.
    pub fn apply_reply(&mut self, body: &str) -> Result<String> {
        let completion: ChatCompletion = serde_json::from_str(body).map_err(|e| {
            Error::serialization(format!("malformed relay reply: {e}"), Some(Box::new(e)))
        })?;
        let reply = completion.reply_text().ok_or(Error::EmptyReply)?.to_string();
        self.transcript.push_assistant(reply.clone());
        self.chat_view.push(DisplayMessage::advisor(reply.clone()));
        self.routine_active = true;
        debug_assert!(self.transcript.has_assistant_reply());
        Ok(reply)
    }

    fn relay_request(&self) -> RelayRequest {
        RelayRequest::new(self.transcript.messages().to_vec(), self.web_search)
    }

    /// Cards for every product matching `filter`.
    pub fn product_cards<'a>(&'a self, filter: &CatalogFilter) -> ProductCards<'a> {
        ProductCards {
            filtered: self.catalog.filter(filter),
            selection: &self.selection,
        }
    }

    /// Selected products in selection order.
    pub fn selected_products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.catalog.get(*id))
    }

    /// Shortlist entries in selection order.
    pub fn selected_chips(&self) -> impl Iterator<Item = SelectedChip<'_>> + '_ {
        self.selected_products()
            .map(|product| SelectedChip { product })
    }

    /// The loaded catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The conversation sent to the relay.
    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// The conversation as displayed.
    pub fn chat_view(&self) -> &[DisplayMessage] {
        &self.chat_view
    }

    /// True once a routine has been generated since the last reset.
    pub fn routine_active(&self) -> bool {
        self.routine_active
    }

    /// Whether relay calls ask for web search.
    pub fn web_search(&self) -> bool {
        self.web_search
    }
}

/// Prompt asking the advisor for a routine over `products`.
pub fn routine_prompt(products: &[&Product]) -> String {
    let lines = products
        .iter()
        .map(|p| {
            format!(
                "- {} {} ({}): {}",
                p.brand,
                p.name,
                format_category(&p.category),
                p.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Create a step-by-step beauty routine using only these L'Oréal group products. Include when to use each item, quick tips, and any warnings.\n{lines}"
    )
}

/// What the chat window shows in place of the routine prompt.
pub fn routine_summary(products: &[&Product]) -> String {
    let bullets = products
        .iter()
        .map(|p| format!("• {} {}", p.brand, p.name))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Here are the products I want to use:\n{bullets}\nPlease create a beauty routine.")
}
