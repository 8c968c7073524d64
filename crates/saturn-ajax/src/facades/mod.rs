//! Per-service facades bound to one cancellation signal.
//!
//! Facades are cheap values holding a context handle and a signal; build a
//! fresh [`Ajax`] for every view instead of sharing one.

mod billing;
mod buckets;
mod dockstore;
mod duos;
mod google_billing;
mod groups;
mod jupyter;
mod martha;
mod methods;
mod user;
mod workspaces;

use reqwest::Method;
use saturn_config::Endpoint;

pub use billing::{Billing, BillingProject};
pub use buckets::{Buckets, Notebook, notebook_object_name};
pub use dockstore::{Dockstore, dockstore_tool_path};
pub use duos::Duos;
pub use google_billing::GoogleBilling;
pub use groups::{Group, Groups};
pub use jupyter::{CLUSTER_SCOPES, Cluster, ClusterNotebooks, Jupyter};
pub use martha::Martha;
pub use methods::{AgoraMethod, Methods};
pub use user::{BLANK_PROFILE_FIELDS, STORAGE_SCOPES, User};
pub use workspaces::{MethodConfig, Submission, Workspace, Workspaces};

use crate::context::ClientContext;
use crate::error::AjaxResult;
use crate::request::Call;
use crate::signal::Signal;

/// Every facade, bound to one signal.
pub struct Ajax {
    /// Identity, profile and terms of service.
    pub user: User,
    /// Access groups.
    pub groups: Groups,
    /// Billing projects.
    pub billing: Billing,
    /// Workspaces, entities and method configurations.
    pub workspaces: Workspaces,
    /// Bucket objects and notebooks.
    pub buckets: Buckets,
    /// Cloud billing accounts.
    pub google_billing: GoogleBilling,
    /// Method repository.
    pub methods: Methods,
    /// Notebook clusters.
    pub jupyter: Jupyter,
    /// Dockstore workflows.
    pub dockstore: Dockstore,
    /// Data URI resolution.
    pub martha: Martha,
    /// Consent registry.
    pub duos: Duos,
}

impl Ajax {
    /// Bind every facade to `signal`.
    #[must_use]
    pub fn new(ctx: &ClientContext, signal: &Signal) -> Self {
        let bound = Bound {
            ctx: ctx.clone(),
            signal: signal.clone(),
        };
        Self {
            user: User::new(bound.clone()),
            groups: Groups::new(bound.clone()),
            billing: Billing::new(bound.clone()),
            workspaces: Workspaces::new(bound.clone()),
            buckets: Buckets::new(bound.clone()),
            google_billing: GoogleBilling::new(bound.clone()),
            methods: Methods::new(bound.clone()),
            jupyter: Jupyter::new(bound.clone()),
            dockstore: Dockstore::new(bound.clone()),
            martha: Martha::new(bound.clone()),
            duos: Duos::new(bound),
        }
    }
}

/// A context paired with the signal its requests are bound to.
#[derive(Clone)]
pub(crate) struct Bound {
    ctx: ClientContext,
    signal: Signal,
}

impl Bound {
    fn call(&self, endpoint: Endpoint, method: Method, path: &str) -> Call<'_> {
        self.ctx.call(&self.signal, endpoint, method, path)
    }

    fn call_url(&self, method: Method, url: &str) -> Call<'_> {
        self.ctx.call_url(&self.signal, method, url)
    }

    fn config(&self) -> &saturn_config::ClientConfig {
        self.ctx.config()
    }

    async fn pet_token(&self, namespace: &str) -> AjaxResult<String> {
        user::pet_token(self, namespace).await
    }
}
