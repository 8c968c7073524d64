//! Workspaces, their entities, method configurations and submissions.

use reqwest::Method;
use saturn_api_models::{
    Attributes, BagitImport, EntityCopyRequest, EntityImport, EntityQuery, EntityUpsert,
    MethodConfigCopy, MethodConfigRef, WorkspaceRef,
};
use saturn_config::Endpoint;
use serde_json::{Value, json};
use tracing::debug;

use super::Bound;
use crate::attributes::{attribute_removal_ops, attribute_update_ops, merge_json};
use crate::error::AjaxResult;
use crate::session::Auth;
use crate::transport::AjaxResponse;

/// Workspace listing and creation.
pub struct Workspaces {
    bound: Bound,
}

impl Workspaces {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Workspaces visible to the user.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, "workspaces")
            .fetch_json()
            .await
    }

    /// Create a workspace from `body`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn create(&self, body: &Value) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, "workspaces")
            .json(body)?
            .fetch_json()
            .await
    }

    /// Users the caller has shared workspaces with.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_share_log(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Orchestration, Method::GET, "api/sharelog/sharees")
            .query("shareType", "workspace")
            .fetch_json()
            .await
    }

    /// Operations on one workspace.
    #[must_use]
    pub fn workspace(&self, namespace: &str, name: &str) -> Workspace<'_> {
        Workspace {
            bound: &self.bound,
            target: WorkspaceRef::new(namespace, name),
        }
    }
}

/// One workspace.
pub struct Workspace<'a> {
    bound: &'a Bound,
    target: WorkspaceRef,
}

impl Workspace<'_> {
    fn root(&self) -> String {
        format!("workspaces/{}/{}", self.target.namespace, self.target.name)
    }

    fn orchestration_root(&self) -> String {
        format!("api/workspaces/{}/{}", self.target.namespace, self.target.name)
    }

    fn method_configs_path(&self) -> String {
        format!("{}/methodconfigs", self.root())
    }

    /// Workspace details.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn details(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &self.root())
            .fetch_json()
            .await
    }

    /// Access control list.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_acl(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &format!("{}/acl", self.root()))
            .fetch_json()
            .await
    }

    /// Apply ACL `updates`; unknown users are invited when `invite_new`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn update_acl(&self, updates: &Value, invite_new: bool) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::PATCH, &format!("{}/acl", self.root()))
            .query("inviteUsersNotFound", invite_new)
            .json(updates)?
            .fetch_json()
            .await
    }

    /// Entity types with counts and attribute names.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn entity_metadata(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &format!("{}/entities", self.root()))
            .fetch_json()
            .await
    }

    /// Create one entity.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn create_entity(&self, payload: &Value) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, &format!("{}/entities", self.root()))
            .json(payload)?
            .fetch_json()
            .await
    }

    /// Every entity of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn entities_of_type(&self, entity_type: &str) -> AjaxResult<Value> {
        self.bound
            .call(
                Endpoint::Rawls,
                Method::GET,
                &format!("{}/entities/{entity_type}", self.root()),
            )
            .fetch_json()
            .await
    }

    /// One page of entities of `entity_type`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn paginated_entities_of_type(&self, entity_type: &str, query: &EntityQuery) -> AjaxResult<Value> {
        let call = self.bound.call(
            Endpoint::Rawls,
            Method::GET,
            &format!("{}/entityQuery/{entity_type}", self.root()),
        );
        query
            .to_pairs()
            .into_iter()
            .fold(call, |call, (key, value)| call.query(key, value))
            .fetch_json()
            .await
    }

    /// Method configurations, from every repository unless `all_repos` is false.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_method_configs(&self, all_repos: bool) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &self.method_configs_path())
            .query("allRepos", all_repos)
            .fetch_json()
            .await
    }

    /// Import a method configuration that points at a Docker-hosted method.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn import_method_config_from_docker(&self, payload: &Value) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, &self.method_configs_path())
            .json(payload)?
            .fetch_ok()
            .await
    }

    /// Operations on one method configuration.
    #[must_use]
    pub fn method_config(&self, config_namespace: &str, config_name: &str) -> MethodConfig<'_> {
        MethodConfig {
            workspace: self,
            namespace: config_namespace.to_string(),
            name: config_name.to_string(),
        }
    }

    /// Submissions in the workspace.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn list_submissions(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::GET, &format!("{}/submissions", self.root()))
            .fetch_json()
            .await
    }

    /// Operations on one submission.
    #[must_use]
    pub fn submission(&self, submission_id: &str) -> Submission<'_> {
        Submission {
            workspace: self,
            path: format!("{}/submissions/{submission_id}", self.root()),
        }
    }

    /// Delete the workspace.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::DELETE, &self.root())
            .fetch_ok()
            .await
    }

    /// Clone into a new workspace described by `body`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn clone_workspace(&self, body: &Value) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rawls, Method::POST, &format!("{}/clone", self.root()))
            .json(body)?
            .fetch_json()
            .await
    }

    /// Set the given attributes, leaving others untouched.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn shallow_merge_new_attributes(&self, attributes: &Attributes) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::PATCH, &self.root())
            .json(&attribute_update_ops(attributes))?
            .fetch_ok()
            .await
    }

    /// Remove the named attributes.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete_attributes<S: AsRef<str>>(&self, names: &[S]) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rawls, Method::PATCH, &self.root())
            .json(&attribute_removal_ops(names))?
            .fetch_ok()
            .await
    }

    /// Import entity tables from a BagIt archive.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn import_bagit(&self, bagit_url: &str) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(
                Endpoint::Orchestration,
                Method::POST,
                &format!("{}/importBagit", self.orchestration_root()),
            )
            .json(&BagitImport {
                bagit_url: bagit_url.to_string(),
                format: "TSV".to_string(),
            })?
            .fetch_ok()
            .await
    }

    /// Fetch an entity list from `url` and upsert it into the workspace.
    ///
    /// The source is fetched without credentials.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors of either request.
    pub async fn import_entities(&self, url: &str) -> AjaxResult<AjaxResponse> {
        let Some(entities) = self
            .bound
            .call_url(Method::GET, url)
            .auth(Auth::None)
            .fetch_json::<Vec<EntityImport>>()
            .await?
        else {
            return Ok(None);
        };
        debug!(count = entities.len(), source = url, "importing entities");
        let upserts: Vec<EntityUpsert> = entities
            .into_iter()
            .map(|entity| EntityUpsert {
                operations: attribute_update_ops(&entity.attributes),
                name: entity.name,
                entity_type: entity.entity_type,
            })
            .collect();
        self.bound
            .call(
                Endpoint::Rawls,
                Method::POST,
                &format!("{}/entities/batchUpsert", self.root()),
            )
            .json(&upserts)?
            .fetch_ok()
            .await
    }

    /// Delete the listed entities.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete_entities(&self, entities: &Value) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(
                Endpoint::Rawls,
                Method::POST,
                &format!("{}/entities/delete", self.root()),
            )
            .json(entities)?
            .fetch_ok()
            .await
    }

    /// Copy entities into another workspace, linking existing ones when `link`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn copy_entities(
        &self,
        destination: &WorkspaceRef,
        entity_type: &str,
        entity_names: &[String],
        link: bool,
    ) -> AjaxResult<Value> {
        let payload = EntityCopyRequest {
            source_workspace: self.target.clone(),
            destination_workspace: destination.clone(),
            entity_type: entity_type.to_string(),
            entity_names: entity_names.to_vec(),
        };
        self.bound
            .call(Endpoint::Rawls, Method::POST, "workspaces/entities/copy")
            .query("linkExistingEntities", link)
            .json(&payload)?
            .fetch_json()
            .await
    }

    /// Estimated monthly storage cost of the workspace bucket.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn storage_cost_estimate(&self) -> AjaxResult<Value> {
        self.bound
            .call(
                Endpoint::Orchestration,
                Method::GET,
                &format!("{}/storageCostEstimate", self.orchestration_root()),
            )
            .fetch_json()
            .await
    }
}

/// One method configuration in a workspace.
pub struct MethodConfig<'a> {
    workspace: &'a Workspace<'a>,
    namespace: String,
    name: String,
}

impl MethodConfig<'_> {
    fn path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.workspace.method_configs_path(),
            self.namespace,
            self.name
        )
    }

    /// The configuration.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get(&self) -> AjaxResult<Value> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::GET, &self.path())
            .fetch_json()
            .await
    }

    /// Overwrite the configuration.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn save(&self, payload: &Value) -> AjaxResult<Value> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::POST, &self.path())
            .json(payload)?
            .fetch_json()
            .await
    }

    /// Copy to `destination_namespace/destination_name` in `destination_workspace`.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn copy_to(
        &self,
        destination_namespace: &str,
        destination_name: &str,
        destination_workspace: &WorkspaceRef,
    ) -> AjaxResult<Value> {
        let payload = MethodConfigCopy {
            source: MethodConfigRef {
                namespace: self.namespace.clone(),
                name: self.name.clone(),
                workspace_name: self.workspace.target.clone(),
            },
            destination: MethodConfigRef {
                namespace: destination_namespace.to_string(),
                name: destination_name.to_string(),
                workspace_name: destination_workspace.clone(),
            },
        };
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::POST, "methodconfigs/copy")
            .json(&payload)?
            .fetch_json()
            .await
    }

    /// Validation report for the configuration's inputs and outputs.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn validate(&self) -> AjaxResult<Value> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::GET, &format!("{}/validate", self.path()))
            .fetch_json()
            .await
    }

    /// Submit a run of this configuration; `payload` names the entities.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn launch(&self, payload: &Value) -> AjaxResult<Value> {
        let mut body = payload.clone();
        merge_json(
            &mut body,
            json!({
                "methodConfigurationNamespace": self.namespace,
                "methodConfigurationName": self.name,
            }),
        );
        self.workspace
            .bound
            .call(
                Endpoint::Rawls,
                Method::POST,
                &format!("{}/submissions", self.workspace.root()),
            )
            .json(&body)?
            .fetch_json()
            .await
    }

    /// Delete the configuration.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn delete(&self) -> AjaxResult<AjaxResponse> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::DELETE, &self.path())
            .fetch_ok()
            .await
    }
}

/// One submission.
pub struct Submission<'a> {
    workspace: &'a Workspace<'a>,
    path: String,
}

impl Submission<'_> {
    /// Submission status and workflows.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get(&self) -> AjaxResult<Value> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::GET, &self.path)
            .fetch_json()
            .await
    }

    /// Abort the submission.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn abort(&self) -> AjaxResult<AjaxResponse> {
        self.workspace
            .bound
            .call(Endpoint::Rawls, Method::DELETE, &self.path)
            .fetch_ok()
            .await
    }
}
