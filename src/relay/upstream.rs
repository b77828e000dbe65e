use std::env;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};

use crate::error::{Error, Result};
use crate::types::ChatCompletionRequest;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// A chat-completion provider the relay forwards to.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Performs exactly one completion call and returns the raw success body.
    ///
    /// A non-success status is reported as `Error::Upstream` carrying the
    /// status code and response text; failing to reach the provider is
    /// `Error::Transport`.
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String>;
}

/// Client for an OpenAI-compatible chat-completion API.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    endpoint: url::Url,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenAi {
    /// Create a new client against the default API URL.
    ///
    /// The API key can be provided directly or read from the OPENAI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None)
    }

    /// Create a new client with a custom base URL, such as a proxy or stub.
    ///
    /// No request timeout is set: a call completes, fails, or waits until
    /// the transport gives up.
    pub fn with_options(api_key: Option<String>, base_url: Option<String>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_VAR).map_err(|_| {
                Error::configuration(
                    "API key not provided and OPENAI_API_KEY environment variable not set",
                )
            })?,
        };

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let endpoint = url::Url::parse(&base_url)?.join("chat/completions")?;

        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::transport(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            api_key,
            client,
            endpoint,
        })
    }

    /// The full chat-completion URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::configuration("API key contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        Ok(headers)
    }

    async fn error_from_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(details) => Error::upstream(status_code, details),
            Err(e) => Error::transport(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }
}

#[async_trait::async_trait]
impl Upstream for OpenAi {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::transport(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::transport(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response.text().await.map_err(|e| {
            Error::transport(
                format!("Failed to read response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}
