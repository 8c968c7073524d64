//! The single routine every request goes through.
//!
//! # Design
//! - The mock switch is consulted before the network; a simulated outcome is
//!   indistinguishable from a real one to the caller.
//! - The transport future races the bound signal; losing the race drops the
//!   in-flight request and resolves to `Ok(None)`.

use std::sync::Arc;

use saturn_telemetry::{ClientMetrics, RequestOutcome};
use tracing::{debug, info, warn};

use crate::error::{AjaxError, AjaxResult, TransportError};
use crate::mock::{MockMode, MockSwitch};
use crate::signal::Signal;
use crate::transport::{AjaxRequest, AjaxResponse, Transport};

/// Sends requests through a transport, honouring the mock switch and signal.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    mock: Arc<MockSwitch>,
    metrics: ClientMetrics,
}

impl Dispatcher {
    /// Assemble a dispatcher from its collaborators.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, mock: Arc<MockSwitch>, metrics: ClientMetrics) -> Self {
        Self {
            transport,
            mock,
            metrics,
        }
    }

    /// The mock switch this dispatcher reads.
    #[must_use]
    pub fn mock(&self) -> &Arc<MockSwitch> {
        &self.mock
    }

    /// Request counters.
    #[must_use]
    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Send `request`, returning whatever status the backend answered with.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::Network`] when no response arrives, including the
    /// simulated no-connection mode.
    pub async fn dispatch(&self, request: AjaxRequest, signal: &Signal) -> AjaxResult<AjaxResponse> {
        let service = request.service;
        let url = request.url.to_string();

        if signal.is_cancelled() {
            debug!(service, url = %url, "signal already triggered; request skipped");
            self.metrics.inc_request(service, RequestOutcome::Cancelled);
            return Ok(None);
        }

        match self.mock.mode() {
            MockMode::Off => {}
            MockMode::NoConnection => {
                info!(service, url = %url, "simulating no connection");
                self.metrics.inc_request(service, RequestOutcome::Simulated);
                return Err(AjaxError::Network {
                    url,
                    source: TransportError::SimulatedNoConnection,
                });
            }
            MockMode::Respond { status, body } => {
                info!(service, url = %url, status, "simulating response");
                self.metrics.inc_request(service, RequestOutcome::Simulated);
                return Ok(Some(AjaxResponse::synthetic(url, status, body)));
            }
        }

        debug!(service, method = %request.method, url = %url, "dispatching request");
        let outcome = tokio::select! {
            biased;
            () = signal.cancelled() => None,
            result = self.transport.send(request) => Some(result),
        };

        match outcome {
            None => {
                debug!(service, url = %url, "request aborted by signal");
                self.metrics.inc_request(service, RequestOutcome::Cancelled);
                Ok(None)
            }
            Some(Ok(response)) => {
                let recorded = if response.is_success() {
                    RequestOutcome::Ok
                } else {
                    RequestOutcome::Status
                };
                debug!(service, url = %url, status = response.status, "response received");
                self.metrics.inc_request(service, recorded);
                Ok(Some(response))
            }
            Some(Err(source)) => {
                warn!(service, url = %url, error = %source, "request failed");
                self.metrics.inc_request(service, RequestOutcome::Network);
                Err(AjaxError::Network { url, source })
            }
        }
    }

    /// Like [`Dispatcher::dispatch`], but rejects non-2xx responses.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::Status`] carrying the raw response for non-2xx
    /// answers, and the errors of [`Dispatcher::dispatch`].
    pub async fn fetch_ok(&self, request: AjaxRequest, signal: &Signal) -> AjaxResult<AjaxResponse> {
        match self.dispatch(request, signal).await? {
            Some(response) if !response.is_success() => Err(AjaxError::Status {
                response: Box::new(response),
            }),
            other => Ok(other),
        }
    }
}
