//! The session manager's handle on the chat relay.
//!
//! [`ChatRelay`] is the seam between the session and the relay. A session
//! can talk to a remote relay over HTTP ([`RelayClient`]), run the relay
//! in-process (any [`Relay`]), or have none configured ([`Unconfigured`]).

use std::sync::Arc;

use reqwest::Client as ReqwestClient;

use crate::error::{Error, Result};
use crate::relay::{Relay, Upstream};
use crate::types::RelayRequest;

/// Status shown when no relay has been configured.
pub const RELAY_NOT_CONFIGURED: &str = "Add your relay URL so the AI can respond.";

/// Something that can carry a transcript to the advisor.
#[async_trait::async_trait]
pub trait ChatRelay: Send + Sync {
    /// Sends the request and returns the raw chat-completion body.
    async fn send(&self, request: &RelayRequest) -> Result<String>;
}

#[async_trait::async_trait]
impl<R: ChatRelay + ?Sized> ChatRelay for Box<R> {
    async fn send(&self, request: &RelayRequest) -> Result<String> {
        (**self).send(request).await
    }
}

#[async_trait::async_trait]
impl<R: ChatRelay + ?Sized> ChatRelay for Arc<R> {
    async fn send(&self, request: &RelayRequest) -> Result<String> {
        (**self).send(request).await
    }
}

#[async_trait::async_trait]
impl<U: Upstream> ChatRelay for Relay<U> {
    async fn send(&self, request: &RelayRequest) -> Result<String> {
        self.relay(&request.messages, request.web_search).await
    }
}

/// Posts requests to a relay service over HTTP.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: ReqwestClient,
    url: url::Url,
}

impl RelayClient {
    /// Creates a client for the relay at `url`.
    pub fn new(url: &str) -> Result<Self> {
        let url = url::Url::parse(url)?;
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::transport(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self { client, url })
    }

    /// The relay URL.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait::async_trait]
impl ChatRelay for RelayClient {
    async fn send(&self, request: &RelayRequest) -> Result<String> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request failed: {}", e), Some(Box::new(e))))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::transport(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        if !status.is_success() {
            return Err(Error::upstream(status.as_u16(), body));
        }
        Ok(body)
    }
}

/// A relay that was never configured; every call fails without I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait::async_trait]
impl ChatRelay for Unconfigured {
    async fn send(&self, _: &RelayRequest) -> Result<String> {
        Err(Error::configuration(RELAY_NOT_CONFIGURED))
    }
}
