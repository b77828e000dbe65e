//! HTTP entry point for the relay.
//!
//! Every path is served by the same handler. Only `POST` is accepted; the
//! body must be JSON with a non-empty `messages` array and an optional
//! `webSearch` flag. Bodies over [`super::RelayConfig::max_body_bytes`] are
//! rejected with a JSON 400.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::Value;

use super::{Relay, Upstream};
use crate::error::{Error, Result};
use crate::observability::RELAY_INVALID_REQUESTS;
use crate::types::{ChatMessage, ErrorBody, RelayRequest};

/// Builds the relay's router.
pub fn router<U: Upstream + 'static>(relay: Arc<Relay<U>>) -> Router {
    let limit = relay.config().max_body_bytes;
    Router::new()
        .fallback(relay_endpoint::<U>)
        .layer(DefaultBodyLimit::max(limit))
        .with_state(relay)
}

async fn relay_endpoint<U: Upstream + 'static>(
    State(relay): State<Arc<Relay<U>>>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    if method != Method::POST {
        tracing::debug!(%method, "rejecting non-POST request");
        return ApiError::method_not_allowed().into_response();
    }

    let request = match body.map_err(unreadable_body).and_then(|b| parse_relay_request(&b)) {
        Ok(request) => request,
        Err(err) => {
            RELAY_INVALID_REQUESTS.click();
            tracing::debug!(error = %err, "rejecting malformed request");
            return ApiError::from(err).into_response();
        }
    };

    tracing::info!(
        messages = request.messages.len(),
        web_search = request.web_search,
        "relaying chat request"
    );
    match relay.relay(&request.messages, request.web_search).await {
        Ok(body) => (
            [
                (CONTENT_TYPE, "application/json"),
                (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            body,
        )
            .into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Parses a relay request body.
///
/// `webSearch` follows JavaScript truthiness, so `1` or `"yes"` enable it
/// and a missing value disables it.
pub fn parse_relay_request(body: &[u8]) -> Result<RelayRequest> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| Error::invalid_request("Request body must be valid JSON"))?;
    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| Error::invalid_request("Include a messages array in the request body"))?;
    let messages = messages
        .iter()
        .cloned()
        .map(serde_json::from_value::<ChatMessage>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::invalid_request(format!("Each message needs a role and content: {e}")))?;
    let web_search = payload.get("webSearch").is_some_and(truthy);
    Ok(RelayRequest::new(messages, web_search))
}

fn unreadable_body(rejection: BytesRejection) -> Error {
    Error::invalid_request(format!(
        "Request body could not be read: {}",
        rejection.body_text()
    ))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            body: ErrorBody::new("Method not allowed"),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidRequest { message } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody::new(message),
            },
            Error::Upstream {
                status_code,
                details,
            } => Self {
                status: StatusCode::from_u16(status_code).unwrap_or(StatusCode::BAD_GATEWAY),
                body: ErrorBody::with_details("Upstream request failed", details),
            },
            Error::Transport { message, .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorBody::with_details("Unable to reach upstream", message),
            },
            other => {
                tracing::error!(error = %other, "relay failure");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody::with_details("Relay failure", other.to_string()),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
