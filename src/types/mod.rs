// Public modules
pub mod chat_completion;
pub mod chat_completion_request;
pub mod chat_message;
pub mod error_body;
pub mod product;
pub mod relay_request;

// Re-exports
pub use chat_completion::{ChatCompletion, Choice, ChoiceMessage};
pub use chat_completion_request::{ChatCompletionRequest, UpstreamTool, WebSearchOptions};
pub use chat_message::{ChatMessage, ChatRole};
pub use error_body::ErrorBody;
pub use product::{CatalogDocument, Product, ProductId};
pub use relay_request::RelayRequest;
