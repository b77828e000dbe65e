//! Executes session effects against the store and the relay.
//!
//! [`SessionManager`] is the only place a [`Session`] meets I/O. Every
//! operation returns an [`Outcome`]; failures are folded into a user-facing
//! status line and never propagate as errors.

use crate::catalog::{Catalog, CatalogFilter};
use crate::error::Error;
use crate::observability::{SESSION_PERSIST_ERRORS, SESSION_RELAY_CALLS, SESSION_RELAY_FAILURES};
use crate::relay_client::ChatRelay;
use crate::session::{Effect, LocalEffect, ProductCards, Session};
use crate::store::{PersistenceStore, load_selection, save_selection};
use crate::types::ProductId;

/// Shown instead of the product grid when the catalog failed to load.
pub const STATUS_CATALOG_UNAVAILABLE: &str =
    "We could not load products right now. Please refresh to try again.";
/// Shown when a routine is requested with nothing selected.
pub const STATUS_EMPTY_SELECTION: &str = "Select at least one product to build your routine.";
/// Shown while a routine request is in flight.
pub const STATUS_GENERATING: &str = "Generating your routine…";
/// Shown once a routine has arrived.
pub const STATUS_ROUTINE_READY: &str = "Routine ready! Ask any follow-up questions.";
/// Shown when a follow-up is attempted before any routine exists.
pub const STATUS_NO_ACTIVE_ROUTINE: &str =
    "Generate a routine first so I know which products you're using.";
/// Shown while a follow-up is in flight.
pub const STATUS_THINKING: &str = "Thinking…";
/// Shown for every failed relay round trip.
pub const STATUS_RELAY_FAILED: &str = "We hit a snag talking to the AI. Try again in a moment.";

/// How an action changes the status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Leave the current status as is.
    #[default]
    Keep,
    /// Remove the current status.
    Clear,
    /// Replace the status with this text.
    Show(String),
}

impl StatusUpdate {
    /// The text to show, if the status is being replaced.
    pub fn text(&self) -> Option<&str> {
        match self {
            StatusUpdate::Show(text) => Some(text),
            StatusUpdate::Keep | StatusUpdate::Clear => None,
        }
    }
}

/// What happened as the result of one user action.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// How the status line changes.
    pub status: StatusUpdate,
    /// The failure, if the action did not succeed.
    pub error: Option<Error>,
    /// Reply text appended to the conversation, if any.
    pub reply: Option<String>,
    /// Whether derived views must be redrawn.
    pub render: bool,
}

impl Outcome {
    /// Returns true if the action succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    fn failed(error: Error) -> Self {
        Self {
            status: StatusUpdate::Show(status_for(&error)),
            error: Some(error),
            reply: None,
            render: false,
        }
    }
}

/// The user-facing status line for an error.
pub fn status_for(error: &Error) -> String {
    match error {
        Error::EmptySelection => STATUS_EMPTY_SELECTION.to_string(),
        Error::NoActiveRoutine => STATUS_NO_ACTIVE_ROUTINE.to_string(),
        Error::CatalogUnavailable { .. } => STATUS_CATALOG_UNAVAILABLE.to_string(),
        Error::UnknownProduct { id } => format!("Product {id} is not in the catalog."),
        Error::Configuration { message } => message.clone(),
        _ => STATUS_RELAY_FAILED.to_string(),
    }
}

/// Owns a [`Session`] together with its relay and persistence store.
pub struct SessionManager<R: ChatRelay, S: PersistenceStore> {
    session: Session,
    relay: R,
    store: S,
}

impl<R: ChatRelay, S: PersistenceStore> SessionManager<R, S> {
    /// Creates a manager over `catalog`, restoring the saved selection.
    pub fn new(catalog: Catalog, relay: R, store: S) -> Self {
        Self::with_session(Session::new(catalog), relay, store)
    }

    /// Wraps an existing session, replacing its selection with the saved one.
    pub fn with_session(mut session: Session, relay: R, store: S) -> Self {
        let saved = load_selection(&store);
        session.restore_selection(&saved);
        Self {
            session,
            relay,
            store,
        }
    }

    /// The managed session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The persistence store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The relay handle.
    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Selects or deselects a product.
    pub fn toggle_selection(&mut self, id: ProductId) -> Outcome {
        match self.session.toggle_selection(id) {
            Ok(effects) => self.apply_local(effects),
            Err(err) => Outcome::failed(err),
        }
    }

    /// Removes a product from the shortlist.
    pub fn remove_selection(&mut self, id: ProductId) -> Outcome {
        let effects = self.session.remove_selection(id);
        self.apply_local(effects)
    }

    /// Empties the shortlist.
    pub fn clear_selection(&mut self) -> Outcome {
        let effects = self.session.clear_selection();
        self.apply_local(effects)
    }

    /// Turns web search on or off for later relay calls.
    pub fn set_web_search(&mut self, enabled: bool) {
        self.session.set_web_search(enabled);
    }

    /// Product cards matching `filter`.
    pub fn filter_catalog(&self, filter: &CatalogFilter) -> ProductCards<'_> {
        self.session.product_cards(filter)
    }

    /// Asks the advisor for a routine over the current selection.
    pub async fn generate_routine(&mut self) -> Outcome {
        match self.session.begin_routine() {
            Ok(effects) => {
                let ready = StatusUpdate::Show(STATUS_ROUTINE_READY.to_string());
                self.apply(effects, ready).await
            }
            Err(err) => Outcome::failed(err),
        }
    }

    /// Asks a follow-up question about the current routine.
    pub async fn send_follow_up(&mut self, message: &str) -> Outcome {
        match self.session.begin_follow_up(message) {
            Ok(effects) => self.apply(effects, StatusUpdate::Clear).await,
            Err(err) => Outcome::failed(err),
        }
    }

    fn apply_local(&mut self, effects: Vec<LocalEffect>) -> Outcome {
        let mut outcome = Outcome::default();
        for effect in effects {
            match effect {
                LocalEffect::Persist(ids) => self.persist(&ids),
                LocalEffect::Render => outcome.render = true,
            }
        }
        outcome
    }

    async fn apply(&mut self, effects: Vec<Effect>, on_success: StatusUpdate) -> Outcome {
        let mut outcome = Outcome::default();
        for effect in effects {
            match effect {
                Effect::Persist(ids) => self.persist(&ids),
                Effect::Render => outcome.render = true,
                Effect::CallRelay(request) => {
                    SESSION_RELAY_CALLS.click();
                    let reply = match self.relay.send(&request).await {
                        Ok(body) => self.session.apply_reply(&body),
                        Err(err) => Err(err),
                    };
                    match reply {
                        Ok(reply) => {
                            outcome.reply = Some(reply);
                            outcome.status = on_success.clone();
                        }
                        Err(err) => {
                            SESSION_RELAY_FAILURES.click();
                            tracing::warn!(error = %err, "chat request failed");
                            outcome.status = StatusUpdate::Show(status_for(&err));
                            outcome.error = Some(err);
                        }
                    }
                }
            }
        }
        outcome
    }

    fn persist(&mut self, ids: &[ProductId]) {
        if let Err(err) = save_selection(&mut self.store, ids) {
            SESSION_PERSIST_ERRORS.click();
            tracing::warn!(error = %err, "could not save selections");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::relay_client::{RELAY_NOT_CONFIGURED, Unconfigured};
    use crate::store::{FileStore, MemoryStore};
    use crate::types::RelayRequest;

    struct Replying(&'static str);

    #[async_trait::async_trait]
    impl ChatRelay for Replying {
        async fn send(&self, _: &RelayRequest) -> crate::error::Result<String> {
            Ok(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": self.0}}]
            })
            .to_string())
        }
    }

    #[test]
    fn toggles_write_through() {
        let mut manager = SessionManager::new(sample_catalog(), Unconfigured, MemoryStore::new());
        assert!(manager.toggle_selection(2).render);
        assert!(manager.toggle_selection(4).is_success());
        assert_eq!(load_selection(manager.store()), vec![2, 4]);
        manager.remove_selection(2);
        assert_eq!(load_selection(manager.store()), vec![4]);
        manager.clear_selection();
        assert!(load_selection(manager.store()).is_empty());
    }

    #[test]
    fn unknown_product_reports_status() {
        let mut manager = SessionManager::new(sample_catalog(), Unconfigured, MemoryStore::new());
        let outcome = manager.toggle_selection(77);
        assert!(outcome.error.unwrap().is_unknown_product());
        assert_eq!(outcome.status.text(), Some("Product 77 is not in the catalog."));
        assert!(!outcome.render);
    }

    #[test]
    fn unconfigured_relay_reports_setup_status() {
        let mut manager = SessionManager::new(sample_catalog(), Unconfigured, MemoryStore::new());
        manager.toggle_selection(1);
        let outcome = tokio_test::block_on(manager.generate_routine());
        assert!(outcome.error.unwrap().is_configuration());
        assert_eq!(outcome.status.text(), Some(RELAY_NOT_CONFIGURED));
        assert!(!manager.session().routine_active());
        assert_eq!(manager.session().transcript().len(), 2);
    }

    #[test]
    fn status_lines() {
        assert_eq!(status_for(&Error::EmptySelection), STATUS_EMPTY_SELECTION);
        assert_eq!(status_for(&Error::NoActiveRoutine), STATUS_NO_ACTIVE_ROUTINE);
        assert_eq!(status_for(&Error::EmptyReply), STATUS_RELAY_FAILED);
        assert_eq!(status_for(&Error::upstream(500, "x")), STATUS_RELAY_FAILED);
        assert_eq!(
            status_for(&Error::transport("refused", None)),
            STATUS_RELAY_FAILED
        );
    }

    #[test]
    fn failed_persist_still_renders() {
        let store = FileStore::new("/dev/full");
        let mut manager = SessionManager::new(sample_catalog(), Unconfigured, store);
        let outcome = manager.toggle_selection(3);
        assert!(outcome.render);
        assert!(outcome.is_success());
        assert_eq!(outcome.status, StatusUpdate::Keep);
        assert!(manager.session().selection().contains(3));
    }

    #[test]
    fn follow_up_status_updates() {
        let mut manager =
            SessionManager::new(sample_catalog(), Replying("Use it nightly."), MemoryStore::new());
        manager.toggle_selection(3);
        let outcome = tokio_test::block_on(manager.generate_routine());
        assert_eq!(outcome.status.text(), Some(STATUS_ROUTINE_READY));

        let outcome = tokio_test::block_on(manager.send_follow_up("   "));
        assert_eq!(outcome.status, StatusUpdate::Keep);
        assert!(outcome.reply.is_none());
        assert!(!outcome.render);

        let outcome = tokio_test::block_on(manager.send_follow_up("How often?"));
        assert_eq!(outcome.status, StatusUpdate::Clear);
        assert_eq!(outcome.reply.as_deref(), Some("Use it nightly."));
    }
}
