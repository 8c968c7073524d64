//! Bucket objects and workspace notebooks.
//!
//! Every call authenticates with the pet service account token of the
//! workspace namespace, not the user's own token.

use reqwest::Method;
use reqwest::header::RANGE;
use saturn_api_models::{BucketObject, ObjectListing, UploadFile};
use saturn_config::Endpoint;
use serde_json::Value;

use super::Bound;
use crate::error::{AjaxError, AjaxResult};
use crate::request::{Call, encode_segment};
use crate::session::Auth;
use crate::transport::AjaxResponse;

const NOTEBOOK_PREFIX: &str = "notebooks/";
const NOTEBOOK_EXTENSION: &str = ".ipynb";
const PREVIEW_RANGE: &str = "bytes=0-20000";

/// Encoded object name of the notebook called `name`.
#[must_use]
pub fn notebook_object_name(name: &str) -> String {
    encode_segment(&format!("{NOTEBOOK_PREFIX}{name}{NOTEBOOK_EXTENSION}"))
}

fn object_path(bucket: &str, encoded_object: &str) -> String {
    format!("storage/v1/b/{bucket}/o/{encoded_object}")
}

/// Object storage.
pub struct Buckets {
    bound: Bound,
}

impl Buckets {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Object metadata.
    ///
    /// # Errors
    ///
    /// Returns token, dispatch and decode errors.
    pub async fn get_object(&self, namespace: &str, bucket: &str, object: &str) -> AjaxResult<Value> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        storage_call(&self.bound, Method::GET, &object_path(bucket, &encode_segment(object)), token)
            .fetch_json()
            .await
    }

    /// Object contents; only the first 20 kB unless `full`.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors.
    pub async fn get_object_preview(
        &self,
        namespace: &str,
        bucket: &str,
        object: &str,
        full: bool,
    ) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        let call = storage_call(&self.bound, Method::GET, &object_path(bucket, &encode_segment(object)), token)
            .query("alt", "media");
        let call = if full { call } else { call.header(RANGE, PREVIEW_RANGE) };
        call.fetch_ok().await
    }

    /// Notebooks stored in the workspace bucket.
    ///
    /// # Errors
    ///
    /// Returns token, dispatch and decode errors.
    pub async fn list_notebooks(&self, namespace: &str, bucket: &str) -> AjaxResult<Vec<BucketObject>> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        let listing: Option<ObjectListing> =
            storage_call(&self.bound, Method::GET, &format!("storage/v1/b/{bucket}/o"), token)
                .query("prefix", NOTEBOOK_PREFIX)
                .fetch_json()
                .await?;
        Ok(listing.map(|listing| {
            listing
                .items
                .into_iter()
                .filter(|object| object.name.ends_with(NOTEBOOK_EXTENSION))
                .collect()
        }))
    }

    /// One directory level of the bucket under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns token, dispatch and decode errors.
    pub async fn list(&self, namespace: &str, bucket: &str, prefix: &str) -> AjaxResult<ObjectListing> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        storage_call(&self.bound, Method::GET, &format!("storage/v1/b/{bucket}/o"), token)
            .query("prefix", prefix)
            .query("delimiter", "/")
            .fetch_json()
            .await
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors.
    pub async fn delete(&self, namespace: &str, bucket: &str, name: &str) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        storage_call(&self.bound, Method::DELETE, &object_path(bucket, &encode_segment(name)), token)
            .fetch_ok()
            .await
    }

    /// Upload `file` as `prefix` + file name.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors.
    pub async fn upload(
        &self,
        namespace: &str,
        bucket: &str,
        prefix: &str,
        file: &UploadFile,
    ) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(namespace).await? else {
            return Ok(None);
        };
        storage_call(&self.bound, Method::POST, &format!("upload/storage/v1/b/{bucket}/o"), token)
            .query("uploadType", "media")
            .query("name", format!("{prefix}{}", file.name))
            .body(&file.content_type, file.contents.clone())
            .fetch_ok()
            .await
    }

    /// Operations on one notebook; `name` excludes folder and extension.
    #[must_use]
    pub fn notebook(&self, namespace: &str, bucket: &str, name: &str) -> Notebook<'_> {
        Notebook {
            bound: &self.bound,
            namespace: namespace.to_string(),
            bucket: bucket.to_string(),
            name: name.to_string(),
        }
    }
}

/// One notebook in a workspace bucket.
pub struct Notebook<'a> {
    bound: &'a Bound,
    namespace: String,
    bucket: String,
    name: String,
}

impl Notebook<'_> {
    fn path(&self) -> String {
        object_path(&self.bucket, &notebook_object_name(&self.name))
    }

    /// Notebook rendered to HTML by the conversion service.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors of either step.
    pub async fn preview(&self) -> AjaxResult<String> {
        let Some(token) = self.bound.pet_token(&self.namespace).await? else {
            return Ok(None);
        };
        let Some(notebook) = storage_call(self.bound, Method::GET, &self.path(), token)
            .query("alt", "media")
            .fetch_text()
            .await?
        else {
            return Ok(None);
        };
        self.bound
            .call(Endpoint::Calhoun, Method::POST, "api/convert")
            .body("text/plain;charset=UTF-8", notebook.into_bytes())
            .fetch_text()
            .await
    }

    /// Copy to `new_name` in `new_bucket`.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors.
    pub async fn copy(&self, new_name: &str, new_bucket: &str) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(&self.namespace).await? else {
            return Ok(None);
        };
        let path = format!(
            "{}/copyTo/b/{new_bucket}/o/{}",
            self.path(),
            notebook_object_name(new_name)
        );
        storage_call(self.bound, Method::POST, &path, token)
            .fetch_ok()
            .await
    }

    /// Write a new notebook with `contents`.
    ///
    /// # Errors
    ///
    /// Returns token, encode and dispatch errors.
    pub async fn create(&self, contents: &Value) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(&self.namespace).await? else {
            return Ok(None);
        };
        let bytes = serde_json::to_vec(contents)
            .map_err(|source| AjaxError::Encode { source })?;
        storage_call(
            self.bound,
            Method::POST,
            &format!("upload/storage/v1/b/{}/o", self.bucket),
            token,
        )
        .query("uploadType", "media")
        .query("name", format!("{NOTEBOOK_PREFIX}{}{NOTEBOOK_EXTENSION}", self.name))
        .body("application/x-ipynb+json", bytes)
        .fetch_ok()
        .await
    }

    /// Delete the notebook.
    ///
    /// # Errors
    ///
    /// Returns token and dispatch errors.
    pub async fn delete(&self) -> AjaxResult<AjaxResponse> {
        let Some(token) = self.bound.pet_token(&self.namespace).await? else {
            return Ok(None);
        };
        storage_call(self.bound, Method::DELETE, &self.path(), token)
            .fetch_ok()
            .await
    }

    /// Object metadata.
    ///
    /// # Errors
    ///
    /// Returns token, dispatch and decode errors.
    pub async fn get_object(&self) -> AjaxResult<Value> {
        let Some(token) = self.bound.pet_token(&self.namespace).await? else {
            return Ok(None);
        };
        storage_call(self.bound, Method::GET, &self.path(), token)
            .fetch_json()
            .await
    }

    /// Rename within the same bucket: copy, wait for the copy, then delete.
    ///
    /// # Errors
    ///
    /// Returns the failure of either step; nothing is deleted if the copy failed.
    pub async fn rename(&self, new_name: &str) -> AjaxResult<AjaxResponse> {
        if self.copy(new_name, &self.bucket).await?.is_none() {
            return Ok(None);
        }
        self.delete().await
    }
}

fn storage_call<'a>(bound: &'a Bound, method: Method, path: &str, token: String) -> Call<'a> {
    bound
        .call(Endpoint::GoogleStorage, method, path)
        .auth(Auth::Bearer(token))
}
