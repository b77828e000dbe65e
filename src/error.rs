//! Error types for routine-builder.
//!
//! One error type covers both halves of the system: the session manager
//! that owns selection and conversation state, and the relay that forwards
//! transcripts to the upstream chat-completion API.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::types::ProductId;

/// The main error type for routine-builder.
#[derive(Clone, Debug)]
pub enum Error {
    /// The product catalog could not be fetched or parsed.
    CatalogUnavailable {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A product id that is not in the loaded catalog.
    UnknownProduct {
        /// The rejected id.
        id: ProductId,
    },

    /// A routine was requested with nothing selected.
    EmptySelection,

    /// A follow-up was sent before any routine was generated.
    NoActiveRoutine,

    /// The relay rejected the shape of its input.
    InvalidRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The upstream provider answered with a non-success status.
    Upstream {
        /// HTTP status code returned by the provider.
        status_code: u16,
        /// Opaque response body from the provider.
        details: String,
    },

    /// The provider could not be reached, or answered with something unusable.
    Transport {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The provider succeeded but returned no usable reply text.
    EmptyReply,

    /// Missing or invalid configuration, such as an unset credential.
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },
}

impl Error {
    /// Creates a new catalog-unavailable error.
    pub fn catalog_unavailable(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::CatalogUnavailable {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new unknown-product error.
    pub fn unknown_product(id: ProductId) -> Self {
        Error::UnknownProduct { id }
    }

    /// Creates a new invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new upstream error.
    pub fn upstream(status_code: u16, details: impl Into<String>) -> Self {
        Error::Upstream {
            status_code,
            details: details.into(),
        }
    }

    /// Creates a new transport error.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Transport {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Returns true if the catalog could not be loaded.
    pub fn is_catalog_unavailable(&self) -> bool {
        matches!(self, Error::CatalogUnavailable { .. })
    }

    /// Returns true if this error rejected an unknown product id.
    pub fn is_unknown_product(&self) -> bool {
        matches!(self, Error::UnknownProduct { .. })
    }

    /// Returns true if a routine was requested with an empty selection.
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Error::EmptySelection)
    }

    /// Returns true if a follow-up was sent before a routine existed.
    pub fn is_no_active_routine(&self) -> bool {
        matches!(self, Error::NoActiveRoutine)
    }

    /// Returns true if the relay rejected its input.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest { .. })
    }

    /// Returns true if the upstream provider answered with a failure status.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. })
    }

    /// Returns true if the provider could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Returns true if the provider returned no usable text.
    pub fn is_empty_reply(&self) -> bool {
        matches!(self, Error::EmptyReply)
    }

    /// Returns true if a value could not be encoded or decoded.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. })
    }

    /// Returns true if a local file operation failed.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Returns true if this error came out of a relay round trip.
    ///
    /// These are the failures a user may clear by simply trying again.
    pub fn is_relay_failure(&self) -> bool {
        matches!(
            self,
            Error::Upstream { .. }
                | Error::Transport { .. }
                | Error::EmptyReply
                | Error::Serialization { .. }
        )
    }

    /// Returns the upstream status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Upstream { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CatalogUnavailable { message, .. } => {
                write!(f, "Catalog unavailable: {message}")
            }
            Error::UnknownProduct { id } => {
                write!(f, "Unknown product: {id}")
            }
            Error::EmptySelection => {
                write!(f, "No products selected")
            }
            Error::NoActiveRoutine => {
                write!(f, "No routine has been generated yet")
            }
            Error::InvalidRequest { message } => {
                write!(f, "Invalid request: {message}")
            }
            Error::Upstream {
                status_code,
                details,
            } => {
                if details.is_empty() {
                    write!(f, "Upstream error: status {status_code}")
                } else {
                    write!(f, "Upstream error: status {status_code}: {details}")
                }
            }
            Error::Transport { message, .. } => {
                write!(f, "Transport error: {message}")
            }
            Error::EmptyReply => {
                write!(f, "No content returned from the AI")
            }
            Error::Configuration { message } => {
                write!(f, "Configuration error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::CatalogUnavailable { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Transport { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for routine-builder operations.
pub type Result<T> = std::result::Result<T, Error>;
