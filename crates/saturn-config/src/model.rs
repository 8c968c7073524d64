//! Typed client configuration models.
//!
//! # Design
//! - Pure data carriers deserialised from the runtime `config.json` document,
//!   which keeps every key at the top level (`samUrlRoot`, `googleClientId`, ...).
//! - Normalisation and checks live in `validate.rs`; IO lives in `loader.rs`.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Backend services the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Identity and access management (users, groups, pet tokens).
    Sam,
    /// Workspace, entity, billing-project and submission service.
    Rawls,
    /// Notebook cluster service.
    Leo,
    /// Dockstore GA4GH tool registry.
    Dockstore,
    /// Method repository.
    Agora,
    /// Orchestration layer in front of the other services.
    Orchestration,
    /// Survey and first-login bookkeeping.
    Rex,
    /// Terms-of-service acceptance records.
    Tos,
    /// Notebook-to-HTML conversion.
    Calhoun,
    /// Data URI resolution.
    Martha,
    /// Object storage JSON API.
    GoogleStorage,
    /// Cloud billing API.
    GoogleBilling,
    /// Support ticket system.
    Zendesk,
}

impl Endpoint {
    /// Every endpoint, in configuration-document order.
    pub const ALL: [Self; 13] = [
        Self::Sam,
        Self::Rawls,
        Self::Leo,
        Self::Dockstore,
        Self::Agora,
        Self::Orchestration,
        Self::Rex,
        Self::Tos,
        Self::Calhoun,
        Self::Martha,
        Self::GoogleStorage,
        Self::GoogleBilling,
        Self::Zendesk,
    ];

    /// Key used for the endpoint in the configuration document.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Sam => "samUrlRoot",
            Self::Rawls => "rawlsUrlRoot",
            Self::Leo => "leoUrlRoot",
            Self::Dockstore => "dockstoreUrlRoot",
            Self::Agora => "agoraUrlRoot",
            Self::Orchestration => "orchestrationUrlRoot",
            Self::Rex => "rexUrlRoot",
            Self::Tos => "tosUrlRoot",
            Self::Calhoun => "calhounUrlRoot",
            Self::Martha => "marthaUrlRoot",
            Self::GoogleStorage => "googleStorageUrlRoot",
            Self::GoogleBilling => "googleBillingUrlRoot",
            Self::Zendesk => "zendeskUrlRoot",
        }
    }

    /// Short lowercase name, used for metrics labels and environment keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sam => "sam",
            Self::Rawls => "rawls",
            Self::Leo => "leo",
            Self::Dockstore => "dockstore",
            Self::Agora => "agora",
            Self::Orchestration => "orchestration",
            Self::Rex => "rex",
            Self::Tos => "tos",
            Self::Calhoun => "calhoun",
            Self::Martha => "martha",
            Self::GoogleStorage => "google_storage",
            Self::GoogleBilling => "google_billing",
            Self::Zendesk => "zendesk",
        }
    }

    /// Environment variable overriding this endpoint (`SATURN_SAM_URL`, ...).
    #[must_use]
    pub fn env_key(self) -> String {
        format!(
            "{}{}_URL",
            defaults::ENV_PREFIX,
            self.as_str().to_ascii_uppercase()
        )
    }
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Base URL for every backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Identity service root.
    #[serde(rename = "samUrlRoot")]
    pub sam: String,
    /// Workspace service root.
    #[serde(rename = "rawlsUrlRoot")]
    pub rawls: String,
    /// Notebook cluster service root.
    #[serde(rename = "leoUrlRoot")]
    pub leo: String,
    /// Dockstore root; port 8443 is assigned when none is given.
    #[serde(rename = "dockstoreUrlRoot")]
    pub dockstore: String,
    /// Method repository root.
    #[serde(rename = "agoraUrlRoot")]
    pub agora: String,
    /// Orchestration root.
    #[serde(rename = "orchestrationUrlRoot")]
    pub orchestration: String,
    /// Survey service root.
    #[serde(rename = "rexUrlRoot")]
    pub rex: String,
    /// Terms-of-service root.
    #[serde(rename = "tosUrlRoot")]
    pub tos: String,
    /// Notebook conversion root.
    #[serde(rename = "calhounUrlRoot")]
    pub calhoun: String,
    /// URI resolver endpoint (called directly, without a path).
    #[serde(rename = "marthaUrlRoot")]
    pub martha: String,
    /// Object storage root.
    #[serde(rename = "googleStorageUrlRoot", default = "defaults::google_storage_root")]
    pub google_storage: String,
    /// Cloud billing root.
    #[serde(rename = "googleBillingUrlRoot", default = "defaults::google_billing_root")]
    pub google_billing: String,
    /// Support ticket root.
    #[serde(rename = "zendeskUrlRoot", default = "defaults::zendesk_root")]
    pub zendesk: String,
}

impl ServiceEndpoints {
    /// Build a catalogue that routes every service to the same root.
    #[must_use]
    pub fn uniform(root: &str) -> Self {
        let root = root.trim_end_matches('/').to_string();
        Self {
            sam: root.clone(),
            rawls: root.clone(),
            leo: root.clone(),
            dockstore: root.clone(),
            agora: root.clone(),
            orchestration: root.clone(),
            rex: root.clone(),
            tos: root.clone(),
            calhoun: root.clone(),
            martha: root.clone(),
            google_storage: root.clone(),
            google_billing: root.clone(),
            zendesk: root,
        }
    }

    /// Root URL configured for the endpoint.
    #[must_use]
    pub fn get(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Sam => &self.sam,
            Endpoint::Rawls => &self.rawls,
            Endpoint::Leo => &self.leo,
            Endpoint::Dockstore => &self.dockstore,
            Endpoint::Agora => &self.agora,
            Endpoint::Orchestration => &self.orchestration,
            Endpoint::Rex => &self.rex,
            Endpoint::Tos => &self.tos,
            Endpoint::Calhoun => &self.calhoun,
            Endpoint::Martha => &self.martha,
            Endpoint::GoogleStorage => &self.google_storage,
            Endpoint::GoogleBilling => &self.google_billing,
            Endpoint::Zendesk => &self.zendesk,
        }
    }

    pub(crate) fn get_mut(&mut self, endpoint: Endpoint) -> &mut String {
        match endpoint {
            Endpoint::Sam => &mut self.sam,
            Endpoint::Rawls => &mut self.rawls,
            Endpoint::Leo => &mut self.leo,
            Endpoint::Dockstore => &mut self.dockstore,
            Endpoint::Agora => &mut self.agora,
            Endpoint::Orchestration => &mut self.orchestration,
            Endpoint::Rex => &mut self.rex,
            Endpoint::Tos => &mut self.tos,
            Endpoint::Calhoun => &mut self.calhoun,
            Endpoint::Martha => &mut self.martha,
            Endpoint::GoogleStorage => &mut self.google_storage,
            Endpoint::GoogleBilling => &mut self.google_billing,
            Endpoint::Zendesk => &mut self.zendesk,
        }
    }
}

/// Identity the client presents to backend services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdentity {
    /// Value of the `X-App-ID` header.
    #[serde(default = "defaults::app_id")]
    pub app_id: String,
    /// Terms-of-service version recorded on acceptance.
    #[serde(default = "defaults::tos_version")]
    pub tos_version: u32,
    /// OAuth client id handed to newly created clusters.
    #[serde(default)]
    pub google_client_id: Option<String>,
    /// Origin serving the notebook iframe extension script.
    #[serde(default, alias = "devUrlRoot")]
    pub ui_origin: Option<String>,
    /// Version label recorded on clusters created by this client.
    #[serde(default = "defaults::cluster_version")]
    pub cluster_version: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            app_id: defaults::app_id(),
            tos_version: defaults::tos_version(),
            google_client_id: None,
            ui_origin: None,
            cluster_version: defaults::cluster_version(),
        }
    }
}

/// Transport settings for outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSettings {
    /// Per-request timeout in seconds.
    #[serde(default = "defaults::http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::http_timeout_secs(),
        }
    }
}

/// Complete runtime configuration for the remote service client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URLs for every backend service.
    #[serde(flatten)]
    pub endpoints: ServiceEndpoints,
    /// Identity presented to backends.
    #[serde(flatten)]
    pub app: AppIdentity,
    /// Transport settings.
    #[serde(default)]
    pub http: HttpSettings,
}

impl ClientConfig {
    /// Configuration with default identity and transport settings.
    #[must_use]
    pub fn with_endpoints(endpoints: ServiceEndpoints) -> Self {
        Self {
            endpoints,
            app: AppIdentity::default(),
            http: HttpSettings::default(),
        }
    }
}
