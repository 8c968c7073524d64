//! Data URI resolution.

use reqwest::Method;
use saturn_api_models::UriResolutionRequest;
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::AjaxResult;

/// URI resolver; the configured root is the endpoint itself.
pub struct Martha {
    bound: Bound,
}

impl Martha {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Resolve `uri` to its storage location and metadata.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn call(&self, uri: &str) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Martha, Method::POST, "")
            .with_app_id()
            .json(&UriResolutionRequest {
                uri: uri.to_string(),
            })?
            .fetch_json()
            .await
    }
}
