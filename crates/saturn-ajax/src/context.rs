//! Shared state behind every facade: configuration, session, dispatcher and
//! token cache.

use std::sync::Arc;

use reqwest::Method;
use saturn_config::{ClientConfig, Endpoint};
use saturn_telemetry::ClientMetrics;

use crate::clock::{Clock, SystemClock};
use crate::dispatch::Dispatcher;
use crate::error::AjaxError;
use crate::mock::MockSwitch;
use crate::request::Call;
use crate::session::Session;
use crate::signal::Signal;
use crate::token_cache::TokenCache;
use crate::transport::{HttpTransport, Transport};

/// Cheaply clonable handle to the client's shared state.
#[derive(Clone)]
pub struct ClientContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: ClientConfig,
    session: Session,
    dispatcher: Dispatcher,
    tokens: TokenCache,
}

impl ClientContext {
    /// Start building a context for `config`.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientContextBuilder {
        ClientContextBuilder {
            config,
            transport: None,
            mock: None,
            clock: None,
            session: None,
            metrics: None,
        }
    }

    /// Runtime configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Signed-in user.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Request dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Pet token cache.
    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.inner.tokens
    }

    /// Request counters.
    #[must_use]
    pub fn metrics(&self) -> &ClientMetrics {
        self.inner.dispatcher.metrics()
    }

    /// Begin a call to `path` under `endpoint`'s root and API prefix.
    pub(crate) fn call<'a>(
        &'a self,
        signal: &'a Signal,
        endpoint: Endpoint,
        method: Method,
        path: &str,
    ) -> Call<'a> {
        Call::to_service(self, signal, endpoint, method, path)
    }

    /// Begin a call to an absolute URL outside the configured services.
    pub(crate) fn call_url<'a>(&'a self, signal: &'a Signal, method: Method, url: &str) -> Call<'a> {
        Call::to_url(self, signal, method, url)
    }
}

/// Builder for [`ClientContext`]; unset collaborators get production defaults.
pub struct ClientContextBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    mock: Option<Arc<MockSwitch>>,
    clock: Option<Arc<dyn Clock>>,
    session: Option<Session>,
    metrics: Option<ClientMetrics>,
}

impl ClientContextBuilder {
    /// Use `transport` instead of an HTTP client.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Read `mock` instead of the process-wide switch.
    #[must_use]
    pub fn mock(mut self, mock: Arc<MockSwitch>) -> Self {
        self.mock = Some(mock);
        self
    }

    /// Time the token cache with `clock`.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing session.
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Record into an existing registry.
    #[must_use]
    pub fn metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Finish the context.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::Build`] when the HTTP client cannot be created and
    /// [`AjaxError::Telemetry`] when metrics cannot be registered.
    pub fn build(self) -> Result<ClientContext, AjaxError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new(&self.config.http)
                    .map_err(|source| AjaxError::Build { source })?,
            ),
        };
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => ClientMetrics::new().map_err(|source| AjaxError::Telemetry { source })?,
        };
        let mock = self.mock.unwrap_or_else(MockSwitch::global);
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(ClientContext {
            inner: Arc::new(ContextInner {
                tokens: TokenCache::new(clock, metrics.clone()),
                dispatcher: Dispatcher::new(transport, mock, metrics),
                session: self.session.unwrap_or_default(),
                config: self.config,
            }),
        })
    }
}
