//! Identity, profile, terms of service, support tickets and surveys.

use reqwest::Method;
use saturn_api_models::{
    NihLinkRequest, SupportRequest, TicketEnvelope, TosRecord, TosStatus, UploadEnvelope,
    UploadFile,
};
use saturn_config::Endpoint;
use serde_json::{Map, Value};

use super::Bound;
use crate::attributes::merge_json;
use crate::error::{AjaxError, AjaxResult};
use crate::request::decode;
use crate::session::Auth;
use crate::transport::AjaxResponse;

/// Scopes requested for pet service account tokens.
pub const STORAGE_SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/devstorage.full_control"];

/// Profile fields that must always be present; unset ones are sent as `N/A`.
pub const BLANK_PROFILE_FIELDS: [&str; 10] = [
    "firstName",
    "lastName",
    "title",
    "institute",
    "institutionalProgram",
    "programLocationCity",
    "programLocationState",
    "programLocationCountry",
    "pi",
    "nonProfitStatus",
];

/// Pet token for `namespace`, served from the context's cache when fresh.
pub(super) async fn pet_token(bound: &Bound, namespace: &str) -> AjaxResult<String> {
    bound
        .ctx
        .tokens()
        .get_or_fetch(namespace, || async {
            bound
                .call(
                    Endpoint::Sam,
                    Method::POST,
                    &format!("api/google/user/petServiceAccount/{namespace}/token"),
                )
                .json(&STORAGE_SCOPES)?
                .fetch_json::<String>()
                .await
        })
        .await
}

/// User-centric operations.
pub struct User {
    bound: Bound,
}

impl User {
    pub(super) fn new(bound: Bound) -> Self {
        Self { bound }
    }

    /// Pet service account token for `namespace`, memoised for 30 minutes.
    ///
    /// # Errors
    ///
    /// Returns the dispatch error of the token exchange.
    pub async fn token(&self, namespace: &str) -> AjaxResult<String> {
        pet_token(&self.bound, namespace).await
    }

    /// Registration status; the response is returned whatever its status.
    ///
    /// # Errors
    ///
    /// Returns network failures only.
    pub async fn get_status(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Sam, Method::GET, "register/user/v2/self/info")
            .send()
            .await
    }

    /// Current profile.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn profile_get(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Orchestration, Method::GET, "register/profile")
            .fetch_json()
            .await
    }

    /// Store profile `fields`; required fields left out are sent as `N/A`.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn profile_set(&self, fields: &Map<String, Value>) -> AjaxResult<AjaxResponse> {
        let mut profile = Value::Object(
            BLANK_PROFILE_FIELDS
                .iter()
                .map(|field| ((*field).to_string(), Value::from("N/A")))
                .collect(),
        );
        merge_json(&mut profile, Value::Object(fields.clone()));
        self.bound
            .call(Endpoint::Orchestration, Method::POST, "register/profile")
            .json(&profile)?
            .fetch_ok()
            .await
    }

    /// Accept the free-credit end user agreement.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn accept_eula(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Orchestration, Method::PUT, "api/profile/trial/userAgreement")
            .fetch_ok()
            .await
    }

    /// Enrol in the free-credit trial.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn start_trial(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Orchestration, Method::POST, "api/profile/trial")
            .fetch_ok()
            .await
    }

    /// Close out a finished trial.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn finalize_trial(&self) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Orchestration, Method::POST, "api/profile/trial")
            .query("operation", "finalize")
            .fetch_ok()
            .await
    }

    /// Proxy group email for a user.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_proxy_group(&self, email: &str) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Orchestration, Method::GET, &format!("api/proxyGroup/{email}"))
            .fetch_json()
            .await
    }

    /// Whether the current terms of service were accepted.
    ///
    /// `403` and `404` mean "not accepted" rather than failure.
    ///
    /// # Errors
    ///
    /// Returns [`AjaxError::Status`] for any other non-2xx status, plus
    /// dispatch and decode errors.
    pub async fn get_tos_accepted(&self) -> AjaxResult<bool> {
        let app = &self.bound.config().app;
        let Some(response) = self
            .bound
            .call(Endpoint::Tos, Method::GET, "user/response")
            .query("appid", &app.app_id)
            .query("tosversion", app.tos_version)
            .send()
            .await?
        else {
            return Ok(None);
        };
        match response.status {
            403 | 404 => Ok(Some(false)),
            _ if !response.is_success() => Err(AjaxError::Status {
                response: Box::new(response),
            }),
            _ => {
                let status: TosStatus = decode(&self.bound.ctx, Endpoint::Tos.as_str(), &response)?;
                Ok(Some(status.accepted))
            }
        }
    }

    /// Record acceptance of the current terms of service.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn accept_tos(&self) -> AjaxResult<()> {
        let app = &self.bound.config().app;
        let record = TosRecord {
            appid: app.app_id.clone(),
            tosversion: app.tos_version,
            accepted: Some(true),
        };
        Ok(self
            .bound
            .call(Endpoint::Tos, Method::POST, "user/response")
            .json(&record)?
            .fetch_ok()
            .await?
            .map(|_| ()))
    }

    /// File a support ticket. Works signed out.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn create_support_request(&self, request: &SupportRequest) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Zendesk, Method::POST, "requests.json")
            .auth(Auth::None)
            .json(&TicketEnvelope::from(request))?
            .fetch_ok()
            .await
    }

    /// Upload a ticket attachment and return the upload record.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn upload_attachment(&self, file: &UploadFile) -> AjaxResult<Value> {
        let envelope: Option<UploadEnvelope> = self
            .bound
            .call(Endpoint::Zendesk, Method::POST, "uploads")
            .auth(Auth::None)
            .query("filename", &file.name)
            .body("application/binary", file.contents.clone())
            .fetch_json()
            .await?;
        Ok(envelope.map(|envelope| envelope.upload))
    }

    /// Record the first sign-in timestamp, returning the stored one.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn first_timestamp(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rex, Method::POST, "firstTimestamps/record")
            .fetch_json()
            .await
    }

    /// Time of the last satisfaction survey response.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn last_nps_response(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Rex, Method::GET, "npsResponses/lastTimestamp")
            .fetch_json()
            .await
    }

    /// Submit a satisfaction survey response.
    ///
    /// # Errors
    ///
    /// Returns dispatch errors.
    pub async fn post_nps_response(&self, body: &Value) -> AjaxResult<AjaxResponse> {
        self.bound
            .call(Endpoint::Rex, Method::POST, "npsResponses/create")
            .json(body)?
            .fetch_ok()
            .await
    }

    /// NIH account link status.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn get_nih_status(&self) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Orchestration, Method::GET, "api/nih/status")
            .fetch_json()
            .await
    }

    /// Link an NIH account using the token from the NIH login flow.
    ///
    /// # Errors
    ///
    /// Returns dispatch and decode errors.
    pub async fn link_nih_account(&self, jwt: &str) -> AjaxResult<Value> {
        self.bound
            .call(Endpoint::Orchestration, Method::POST, "api/nih/callback")
            .json(&NihLinkRequest {
                jwt: jwt.to_string(),
            })?
            .fetch_json()
            .await
    }
}
