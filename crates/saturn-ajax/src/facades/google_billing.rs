//! Cloud billing account lookups.

use reqwest::Method;
use saturn_api_models::ProjectBillingInfoList;
use saturn_config::Endpoint;

use super::Bound;
use crate::error::AjaxResult;

/// Cloud billing API.
pub struct GoogleBilling {
    bound: Bound,
}

impl GoogleBilling {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Ids of the projects attached to `account` (`billingAccounts/...`).
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_project_names(&self, account: &str) -> AjaxResult<Vec<String>> {
        let listing: Option<ProjectBillingInfoList> = self
            .bound
            .call(Endpoint::GoogleBilling, Method::GET, &format!("{account}/projects"))
            .fetch_json()
            .await?;
        Ok(listing.map(|listing| {
            listing
                .project_billing_info
                .into_iter()
                .map(|info| info.project_id)
                .collect()
        }))
    }
}
