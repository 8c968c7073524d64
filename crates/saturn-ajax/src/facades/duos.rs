//! Consent registry lookups.

use reqwest::Method;
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::AjaxResult;

/// Consent registry, reached through orchestration.
pub struct Duos {
    bound: Bound,
}

impl Duos {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Consent record for an ORSP id.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_consent(&self, orsp_id: &str) -> AjaxResult<Value> {
        self.bound
            .call(
                Endpoint::Orchestration,
                Method::GET,
                &format!("api/duos/consent/orsp/{orsp_id}"),
            )
            .fetch_json()
            .await
    }
}
