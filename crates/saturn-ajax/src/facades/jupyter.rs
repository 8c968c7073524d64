//! Notebook clusters run by the Leonardo service.

use reqwest::Method;
use saturn_config::Endpoint;
use serde_json::{Map, Value, json};

use super::Bound;
use crate::attributes::merge_json;
use crate::error::AjaxResult;
use crate::transport::AjaxResponse;

/// OAuth scopes granted to every cluster this client creates.
pub const CLUSTER_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

const IFRAME_EXTENSION: &str = "saturn-iframe-extension";

/// Cluster listing and lookup.
pub struct Jupyter {
    bound: Bound,
}

impl Jupyter {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Clusters created by this client, optionally limited to one project.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn clusters_list(&self, project: Option<&str>) -> AjaxResult<Value> {
        let path = match project {
            Some(project) => format!("api/clusters/{project}"),
            None => "api/clusters".to_string(),
        };
        self.bound
            .call(Endpoint::Leo, Method::GET, &path)
            .query("saturnAutoCreated", true)
            .with_app_id()
            .fetch_json()
            .await
    }

    /// Operations on one cluster.
    #[must_use]
    pub fn cluster(&self, project: &str, name: &str) -> Cluster<'_> {
        Cluster {
            bound: &self.bound,
            project: project.to_string(),
            name: name.to_string(),
        }
    }

    /// Notebook operations proxied through one cluster.
    #[must_use]
    pub fn notebooks(&self, project: &str, name: &str) -> ClusterNotebooks<'_> {
        ClusterNotebooks {
            bound: &self.bound,
            root: format!("notebooks/{project}/{name}"),
        }
    }
}

/// One cluster.
pub struct Cluster<'a> {
    bound: &'a Bound,
    project: String,
    name: String,
}

impl Cluster<'_> {
    fn root(&self) -> String {
        format!("api/cluster/{}/{}", self.project, self.name)
    }

    /// Request body for [`Cluster::create`]: `options` with the client's
    /// labels, client id, notebook extension and scopes merged on top.
    #[must_use]
    pub fn creation_body(&self, options: &Value) -> Value {
        let app = &self.bound.config().app;
        let mut nb_extensions = Map::new();
        if let Some(origin) = &app.ui_origin {
            nb_extensions.insert(
                IFRAME_EXTENSION.to_string(),
                Value::from(format!(
                    "{}/jupyter-iframe-extension.js",
                    origin.trim_end_matches('/')
                )),
            );
        }
        let mut overlay = json!({
            "labels": {
                "saturnAutoCreated": "true",
                "saturnVersion": app.cluster_version,
            },
            "userJupyterExtensionConfig": {
                "nbExtensions": nb_extensions,
                "labExtensions": {},
                "serverExtensions": {},
                "combinedExtensions": {}
            },
            "scopes": CLUSTER_SCOPES,
        });
        if let (Some(client_id), Value::Object(fields)) = (&app.google_client_id, &mut overlay) {
            fields.insert("defaultClientId".to_string(), Value::from(client_id.clone()));
        }
        let mut body = options.clone();
        merge_json(&mut body, overlay);
        body
    }

    /// Create the cluster.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn create(&self, options: &Value) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(
                Endpoint::Leo,
                Method::PUT,
                &format!("api/cluster/v2/{}/{}", self.project, self.name),
            )
            .with_app_id()
            .json(&self.creation_body(options))?
            .fetch_ok()
            .await
    }

    /// Start a stopped cluster.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn start(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Leo, Method::POST, &format!("{}/start", self.root()))
            .with_app_id()
            .fetch_ok()
            .await
    }

    /// Stop a running cluster.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn stop(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Leo, Method::POST, &format!("{}/stop", self.root()))
            .with_app_id()
            .fetch_ok()
            .await
    }

    /// Delete the cluster.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Leo, Method::DELETE, &self.root())
            .with_app_id()
            .fetch_ok()
            .await
    }
}

/// Notebook operations on one cluster.
pub struct ClusterNotebooks<'a> {
    bound: &'a Bound,
    root: String,
}

impl ClusterNotebooks<'_> {
    /// Copy `files` (a destination-to-source map) onto the cluster.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn localize(&self, files: &Value) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Leo, Method::POST, &format!("{}/api/localize", self.root))
            .json(files)?
            .fetch_ok()
            .await
    }

    /// Ask the cluster proxy to set its access cookie.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn set_cookie(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Leo, Method::GET, &format!("{}/setCookie", self.root))
            .fetch_ok()
            .await
    }
}
