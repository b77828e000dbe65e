//! Logging hook for relay traffic.
//!
//! This module provides the [`RelayLogger`] trait that lets embedders
//! observe every upstream call made by a [`crate::Relay`].

use crate::error::Error;
use crate::types::ChatCompletionRequest;

/// A trait for logging relay operations.
///
/// Implement this trait to capture every request sent upstream together
/// with its outcome.
pub trait RelayLogger: Send + Sync {
    /// Log the translated request just before it is sent upstream.
    fn log_request(&self, request: &ChatCompletionRequest);

    /// Log a successful upstream response body.
    fn log_response(&self, body: &str);

    /// Log a failed upstream call.
    fn log_error(&self, error: &Error);
}

/// A [`RelayLogger`] that emits `tracing` events.
///
/// Message contents are never logged, only their shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RelayLogger for TracingLogger {
    fn log_request(&self, request: &ChatCompletionRequest) {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            web_search = request.tools.is_some(),
            "forwarding chat completion"
        );
    }

    fn log_response(&self, body: &str) {
        tracing::debug!(bytes = body.len(), "upstream replied");
    }

    fn log_error(&self, error: &Error) {
        match error.status_code() {
            Some(status) => tracing::warn!(status, error = %error, "upstream request failed"),
            None => tracing::warn!(error = %error, "unable to reach upstream"),
        }
    }
}
