//! Dockstore GA4GH tool registry. No authentication.

use reqwest::Method;
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::AjaxResult;
use crate::request::encode_segment;
use crate::session::Auth;

/// Versions path of the workflow registered at `path`.
///
/// The tool id is `#workflow/<path>`, sent fully encoded as one segment.
#[must_use]
pub fn dockstore_tool_path(path: &str) -> String {
    format!(
        "api/ga4gh/v1/tools/%23workflow%2F{}/versions",
        encode_segment(path)
    )
}

/// Workflow lookups.
pub struct Dockstore {
    bound: Bound,
}

impl Dockstore {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// WDL descriptor of one workflow version.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_wdl(&self, path: &str, version: &str) -> AjaxResult<Value> {
        let route = format!(
            "{}/{}/WDL/descriptor",
            dockstore_tool_path(path),
            encode_segment(version)
        );
        self.bound
            .call(Endpoint::Dockstore, Method::GET, &route)
            .auth(Auth::None)
            .fetch_json()
            .await
    }

    /// Published versions of a workflow.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_versions(&self, path: &str) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Dockstore, Method::GET, &dockstore_tool_path(path))
            .auth(Auth::None)
            .fetch_json()
            .await
    }
}
