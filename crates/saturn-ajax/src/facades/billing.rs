//! Billing projects managed by the workspace service.

use reqwest::Method;
use saturn_api_models::{BillingProjectRequest, BillingRole};
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::AjaxResult;
use crate::roles::{RoleChange, for_each_role, reconcile_roles};
use crate::transport::AjaxResponse;

/// Billing project listing and creation.
pub struct Billing {
    bound: Bound,
}

impl Billing {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Projects the user can bill to.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_projects(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, "user/billing")
            .fetch_json()
            .await
    }

    /// Cloud billing accounts visible to the user.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_accounts(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, "user/billingAccounts")
            .fetch_json()
            .await
    }

    /// Create a project charged to `billing_account`.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn create_project(&self, project_name: &str, billing_account: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, "billing")
            .json(&BillingProjectRequest {
                project_name: project_name.to_string(),
                billing_account: billing_account.to_string(),
            })?
            .fetch_ok()
            .await
    }

    /// Operations on one project.
    #[must_use]
    pub fn project(&self, name: &str) -> BillingProject<'_> {
        BillingProject {
            bound: &self.bound,
            root: format!("billing/{name}"),
        }
    }
}

/// One billing project.
pub struct BillingProject<'a> {
    bound: &'a Bound,
    root: String,
}

impl BillingProject<'_> {
    async fn add_role(&self, role: BillingRole, email: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::PUT, &format!("{}/{role}/{email}", self.root))
            .fetch_ok()
            .await
    }

    async fn remove_role(&self, role: BillingRole, email: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::DELETE, &format!("{}/{role}/{email}", self.root))
            .fetch_ok()
            .await
    }

    /// Project members and their roles.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_users(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &format!("{}/members", self.root))
            .fetch_json()
            .await
    }

    /// Grant every role in `roles` to `email`.
    ///
    /// # Errors
    ///
    /// Returns the first failed grant.
    pub async fn add_user(&self, roles: &[BillingRole], email: &str) -> AjaxResult<Vec<AjaxResponse>> {
        for_each_role(roles, |role| self.add_role(role, email)).await
    }

    /// Revoke every role in `roles` from `email`.
    ///
    /// # Errors
    ///
    /// Returns the first failed revocation.
    pub async fn remove_user(&self, roles: &[BillingRole], email: &str) -> AjaxResult<Vec<AjaxResponse>> {
        for_each_role(roles, |role| self.remove_role(role, email)).await
    }

    /// Move `email` from `old` roles to `new` roles; grants settle before revocations.
    ///
    /// # Errors
    ///
    /// Returns the first failed grant or revocation.
    pub async fn change_user_roles(
        &self,
        email: &str,
        old: &[BillingRole],
        new: &[BillingRole],
    ) -> AjaxResult<RoleChange<BillingRole>> {
        reconcile_roles(
            old,
            new,
            |role| self.add_role(role, email),
            |role| self.remove_role(role, email),
        )
        .await
    }
}
