// Public modules
pub mod catalog;
pub mod chat;
pub mod error;
pub mod manager;
pub mod observability;
pub mod relay;
pub mod relay_client;
pub mod relay_logger;
pub mod selection;
pub mod session;
pub mod store;
pub mod transcript;
pub mod types;

// Re-exports
pub use catalog::{Catalog, CatalogFilter, CatalogProvider, FileCatalog, HttpCatalog};
pub use error::{Error, Result};
pub use manager::{Outcome, SessionManager, StatusUpdate};
pub use observability::register_biometrics;
pub use relay::{OpenAi, Relay, RelayConfig, Upstream, router};
pub use relay_client::{ChatRelay, RelayClient, Unconfigured};
pub use relay_logger::{RelayLogger, TracingLogger};
pub use selection::SelectionSet;
pub use session::{Effect, LocalEffect, Session};
pub use store::{FileStore, MemoryStore, PersistenceStore};
pub use transcript::ChatTranscript;
pub use types::*;
