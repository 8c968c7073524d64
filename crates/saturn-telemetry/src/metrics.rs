//! Prometheus-backed counters for outbound requests.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Each client context owns its registry, so tests never share counters.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A 2xx response was received.
    Ok,
    /// A non-2xx response was received.
    Status,
    /// The transport failed before a response arrived.
    Network,
    /// The response body could not be decoded.
    Decode,
    /// The bound signal aborted the request.
    Cancelled,
    /// The mock switch answered instead of the network.
    Simulated,
}

impl RequestOutcome {
    /// Every outcome, used when building snapshots.
    pub const ALL: [Self; 6] = [
        Self::Ok,
        Self::Status,
        Self::Network,
        Self::Decode,
        Self::Cancelled,
        Self::Simulated,
    ];

    /// Label value recorded in metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Status => "status",
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Cancelled => "cancelled",
            Self::Simulated => "simulated",
        }
    }
}

/// Prometheus registry with the client's request counters.
#[derive(Clone)]
pub struct ClientMetrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    requests_total: IntCounterVec,
    token_fetches_total: IntCounterVec,
}

/// Point-in-time copy of the token counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Token exchanges that completed.
    pub token_fetches_ok: u64,
    /// Token exchanges that failed.
    pub token_fetches_failed: u64,
    /// Requests served by the cache without a fetch.
    pub token_cache_hits: u64,
}

impl ClientMetrics {
    /// Construct a registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "saturn_requests_total",
                "Outbound requests by backend service and outcome",
            ),
            &["service", "outcome"],
        )
        .map_err(|source| TelemetryError::MetricsRegister {
            name: "saturn_requests_total",
            source,
        })?;
        let token_fetches_total = IntCounterVec::new(
            Opts::new(
                "saturn_token_fetches_total",
                "Pet service account token lookups by result",
            ),
            &["outcome"],
        )
        .map_err(|source| TelemetryError::MetricsRegister {
            name: "saturn_token_fetches_total",
            source,
        })?;

        registry
            .register(Box::new(requests_total.clone()))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "saturn_requests_total",
                source,
            })?;
        registry
            .register(Box::new(token_fetches_total.clone()))
            .map_err(|source| TelemetryError::MetricsRegister {
                name: "saturn_token_fetches_total",
                source,
            })?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                requests_total,
                token_fetches_total,
            }),
        })
    }

    /// Count one dispatched request.
    pub fn inc_request(&self, service: &str, outcome: RequestOutcome) {
        self.inner
            .requests_total
            .with_label_values(&[service, outcome.as_str()])
            .inc();
    }

    /// Count a token lookup; `result` is `ok`, `failed` or `hit`.
    pub fn inc_token_fetch(&self, result: &str) {
        self.inner
            .token_fetches_total
            .with_label_values(&[result])
            .inc();
    }

    /// Number of requests recorded for a service and outcome.
    #[must_use]
    pub fn request_count(&self, service: &str, outcome: RequestOutcome) -> u64 {
        self.inner
            .requests_total
            .with_label_values(&[service, outcome.as_str()])
            .get()
    }

    /// Copy the token counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let token = |result: &str| {
            self.inner
                .token_fetches_total
                .with_label_values(&[result])
                .get()
        };
        MetricsSnapshot {
            token_fetches_ok: token("ok"),
            token_fetches_failed: token("failed"),
            token_cache_hits: token("hit"),
        }
    }

    /// Render every collector in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or produces invalid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.inner.registry.gather(), &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}
