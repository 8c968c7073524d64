//! The seam between the dispatcher and the network.
//!
//! # Design
//! - Requests and responses are plain owned values so scripted transports can
//!   record and fabricate them without an HTTP stack.
//! - Responses are buffered in full; every backend answer is small JSON or text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use saturn_config::HttpSettings;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AjaxError, TransportError};

/// A fully assembled outgoing request.
#[derive(Debug, Clone)]
pub struct AjaxRequest {
    /// Backend label used for metrics and logs.
    pub service: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Headers, including authorisation.
    pub headers: HeaderMap,
    /// Raw body, when present.
    pub body: Option<Vec<u8>>,
}

impl AjaxRequest {
    /// Header value as text, when present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Body parsed as JSON, for inspection.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// A buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxResponse {
    /// URL the response came from.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
}

impl AjaxResponse {
    /// A header-less response, as produced by the mock switch.
    #[must_use]
    pub fn synthetic(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::Decode`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AjaxError> {
        serde_json::from_slice(&self.body).map_err(|source| AjaxError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// Header value as text, when present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Sends requests to the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange.
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client honouring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the client cannot be built.
    pub fn new(settings: &HttpSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| TransportError::Request { source })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Request { source })?;
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Body { source })?;
        Ok(AjaxResponse {
            url,
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn success_covers_only_2xx() {
        assert!(AjaxResponse::synthetic("u", 204, "").is_success());
        assert!(!AjaxResponse::synthetic("u", 199, "").is_success());
        assert!(!AjaxResponse::synthetic("u", 302, "").is_success());
    }

    #[test]
    fn malformed_body_reports_decode_error_with_url() {
        let response = AjaxResponse::synthetic("http://rawls.test/api/workspaces", 200, "{malformed");
        let err = response.json::<Value>().expect_err("decode should fail");
        assert!(matches!(err, AjaxError::Decode { ref url, .. } if url == "http://rawls.test/api/workspaces"));
    }
}
