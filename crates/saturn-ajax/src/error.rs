//! Error types for request dispatch.
//!
//! Cancellation is deliberately absent: a request aborted by its signal
//! resolves to `Ok(None)` and never reaches the caller's error path.

use saturn_telemetry::TelemetryError;
use thiserror::Error;

use crate::transport::AjaxResponse;

/// Result of any dispatching operation; `Ok(None)` means the bound signal fired.
pub type AjaxResult<T> = Result<Option<T>, AjaxError>;

/// Failures raised by the transport before a response is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The mock switch is simulating a dropped connection.
    #[error("simulating no connection")]
    SimulatedNoConnection,
    /// The HTTP client could not complete the exchange.
    #[error("request failed")]
    Request {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body could not be read.
    #[error("failed to read response body")]
    Body {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The transport refused the request without reaching the network.
    #[error("transport unavailable: {reason}")]
    Unavailable {
        /// Human-readable reason.
        reason: String,
    },
}

/// Errors surfaced by the remote service client.
#[derive(Debug, Error)]
pub enum AjaxError {
    /// No response was received.
    #[error("network error calling {url}")]
    Network {
        /// Target of the failed request.
        url: String,
        /// Transport failure.
        #[source]
        source: TransportError,
    },
    /// A response arrived with a non-2xx status.
    #[error("request to {} failed with status {}", .response.url, .response.status)]
    Status {
        /// The raw response, kept for status and body inspection.
        response: Box<AjaxResponse>,
    },
    /// The response body was not the expected JSON.
    #[error("malformed response from {url}")]
    Decode {
        /// Source of the body.
        url: String,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A request body could not be serialised.
    #[error("failed to encode request body")]
    Encode {
        /// Serialisation failure.
        #[source]
        source: serde_json::Error,
    },
    /// A request URL could not be assembled.
    #[error("invalid request url '{url}'")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// A header value contained characters HTTP does not allow.
    #[error("invalid value for header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: String,
    },
    /// The call needs the signed-in user's token and nobody is signed in.
    #[error("no signed-in session")]
    MissingSession,
    /// A successful response did not have the shape the operation needs.
    #[error("unexpected payload: {detail}")]
    UnexpectedPayload {
        /// What was wrong.
        detail: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http transport")]
    Build {
        /// Underlying client error.
        #[source]
        source: TransportError,
    },
    /// Request metrics could not be registered.
    #[error("failed to initialise request metrics")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

impl AjaxError {
    /// HTTP status carried by a [`AjaxError::Status`] failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { response } => Some(response.status),
            _ => None,
        }
    }

    /// Raw response carried by a [`AjaxError::Status`] failure.
    #[must_use]
    pub fn response(&self) -> Option<&AjaxResponse> {
        match self {
            Self::Status { response } => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use std::error::Error as _;

    #[test]
    fn status_error_exposes_raw_response() {
        let err = AjaxError::Status {
            response: Box::new(AjaxResponse {
                url: "http://sam.test/api/groups/v1".into(),
                status: 404,
                headers: HeaderMap::new(),
                body: b"missing".to_vec(),
            }),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.response().map(AjaxResponse::text), Some("missing".into()));
        assert_eq!(
            err.to_string(),
            "request to http://sam.test/api/groups/v1 failed with status 404"
        );
    }

    #[test]
    fn network_error_chains_transport_source() {
        let err = AjaxError::Network {
            url: "http://rawls.test/api/workspaces".into(),
            source: TransportError::SimulatedNoConnection,
        };
        assert_eq!(err.status(), None);
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("simulating no connection"));
    }
}
