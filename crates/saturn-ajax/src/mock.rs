//! Developer switch that replaces network I/O with a simulated outcome.
//!
//! A dispatcher reads the switch it was built with on every request.
//! [`MockSwitch::global`] is the process-wide default; tests build their own.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::info;

static GLOBAL: Lazy<Arc<MockSwitch>> = Lazy::new(|| Arc::new(MockSwitch::new()));

/// Body served by [`MockSwitch::malformed`].
pub const MALFORMED_BODY: &str = "{malformed";

/// The active override. Exactly one is in force at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MockMode {
    /// Requests reach the network.
    #[default]
    Off,
    /// Requests fail as if the connection dropped.
    NoConnection,
    /// Requests receive this response.
    Respond {
        /// Simulated status code.
        status: u16,
        /// Simulated body.
        body: String,
    },
}

impl MockMode {
    /// Short description for logs and the CLI.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Off => "not mocking responses".to_string(),
            Self::NoConnection => "simulating no connection".to_string(),
            Self::Respond { status, body } => {
                format!("simulating response: status {status}, body {body:?}")
            }
        }
    }
}

/// Holds the current [`MockMode`].
#[derive(Debug, Default)]
pub struct MockSwitch {
    mode: RwLock<MockMode>,
}

impl MockSwitch {
    /// A switch that is off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide switch.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Report and return the active mode.
    pub fn currently(&self) -> MockMode {
        let mode = self.mode();
        info!(mode = %mode.describe(), "mock switch state");
        mode
    }

    /// Serve `200` with an unparseable JSON body.
    pub fn malformed(&self) {
        self.set(MockMode::Respond {
            status: 200,
            body: MALFORMED_BODY.to_string(),
        });
    }

    /// Fail every request with a network error.
    pub fn no_connection(&self) {
        self.set(MockMode::NoConnection);
    }

    /// Serve `code` with a placeholder body.
    pub fn status(&self, code: u16) {
        self.set(MockMode::Respond {
            status: code,
            body: format!("Body of simulated {code} response"),
        });
    }

    /// Clear any override.
    pub fn off(&self) {
        self.set(MockMode::Off);
    }

    /// Install `mode`, replacing the previous override.
    pub fn set(&self, mode: MockMode) {
        info!(mode = %mode.describe(), "mock switch changed");
        *self.mode.write().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    /// The active mode, without logging.
    #[must_use]
    pub fn mode(&self) -> MockMode {
        self.mode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
