//! Method repository and configuration templates.

use reqwest::Method;
use saturn_api_models::WorkspaceRef;
use saturn_config::Endpoint;
use serde_json::{Value, json};

use super::Bound;
use crate::attributes::merge_json;
use crate::error::{AjaxError, AjaxResult};

/// Method repository queries.
pub struct Methods {
    bound: Bound,
}

impl Methods {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Methods matching the query `params`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list(&self, params: &[(&str, &str)]) -> AjaxResult<Value> {
        let call = params.iter().fold(
            self.bound.call(Endpoint::Agora, Method::GET, "methods"),
            |call, (key, value)| call.query(key, value),
        );
        call.fetch_json().await
    }

    /// Inputs and outputs of the method a loaded configuration points at.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::UnexpectedPayload`] when `loaded_config` has no
    /// `methodRepoMethod`, plus dispatch and decode errors.
    pub async fn config_inputs_outputs(&self, loaded_config: &Value) -> AjaxResult<Value> {
        let method = loaded_config
            .get("methodRepoMethod")
            .ok_or_else(|| AjaxError::UnexpectedPayload {
                detail: "method configuration has no methodRepoMethod".to_string(),
            })?;
        self.bound
            .call(Endpoint::Rawls, Method::POST, "methodconfigs/inputsOutputs")
            .json(method)?
            .fetch_json()
            .await
    }

    /// Blank configuration template for a method.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn template(&self, method: &Value) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, "methodconfigs/template")
            .json(method)?
            .fetch_json()
            .await
    }

    /// Operations on one method snapshot.
    #[must_use]
    pub fn method(&self, namespace: &str, name: &str, snapshot_id: u32) -> AgoraMethod<'_> {
        AgoraMethod {
            bound: &self.bound,
            namespace: namespace.to_string(),
            name: name.to_string(),
            snapshot_id,
        }
    }
}

/// One method snapshot.
pub struct AgoraMethod<'a> {
    bound: &'a Bound,
    namespace: String,
    name: String,
    snapshot_id: u32,
}

impl AgoraMethod<'_> {
    fn root(&self) -> String {
        format!("methods/{}/{}/{}", self.namespace, self.name, self.snapshot_id)
    }

    /// Method metadata and payload.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Agora, Method::GET, &self.root())
            .fetch_json()
            .await
    }

    /// Configurations published for this snapshot.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn configs(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Agora, Method::GET, &format!("{}/configurations", self.root()))
            .fetch_json()
            .await
    }

    /// Default configuration created by [`AgoraMethod::to_workspace`].
    #[must_use]
    pub fn default_config(&self) -> Value {
        json!({
            "methodRepoMethod": {
                "methodUri": format!("agora://{}/{}/{}", self.namespace, self.name, self.snapshot_id)
            },
            "name": self.name,
            "namespace": self.namespace,
            "rootEntityType": "",
            "prerequisites": {},
            "inputs": {},
            "outputs": {},
            "methodConfigVersion": 1,
            "deleted": false
        })
    }

    /// Add a configuration for this method to `workspace`, with `overrides`
    /// deep-merged over the default configuration.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn to_workspace(&self, workspace: &WorkspaceRef, overrides: Option<&Value>) -> AjaxResult<Value> {
        let mut config = self.default_config();
        if let Some(overrides) = overrides {
            merge_json(&mut config, overrides.clone());
        }
        self.bound
            .call(
                Endpoint::Rawls,
                Method::POST,
                &format!("workspaces/{}/{}/methodconfigs", workspace.namespace, workspace.name),
            )
            .json(&config)?
            .fetch_json()
            .await
    }
}
