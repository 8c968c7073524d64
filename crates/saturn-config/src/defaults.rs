//! Built-in values applied when the configuration document omits a field.
//!
//! # Design
//! - Centralise defaults so the loader, validation and tests agree.
//! - Public storage/billing/support roots are defaults, not constants, so a
//!   deployment may point them elsewhere.

/// Application identifier sent in the `X-App-ID` header.
pub(crate) const APP_ID: &str = "Saturn";
/// Terms-of-service document version the client accepts.
pub(crate) const TOS_VERSION: u32 = 4;
/// Label recorded on clusters created by this client.
pub(crate) const CLUSTER_VERSION: &str = "1";
/// Request timeout applied by the HTTP transport.
pub(crate) const HTTP_TIMEOUT_SECS: u64 = 30;
/// Upper bound accepted for the request timeout.
pub(crate) const MAX_HTTP_TIMEOUT_SECS: u64 = 600;
/// Port the Dockstore API is served on when the root URL omits one.
pub const DOCKSTORE_PORT: u16 = 8443;
/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SATURN_";

pub(crate) const GOOGLE_STORAGE_ROOT: &str = "https://www.googleapis.com";
pub(crate) const GOOGLE_BILLING_ROOT: &str = "https://cloudbilling.googleapis.com/v1";
pub(crate) const ZENDESK_ROOT: &str = "https://broadinstitute.zendesk.com/api/v2";

pub(crate) fn app_id() -> String {
    APP_ID.to_string()
}

pub(crate) const fn tos_version() -> u32 {
    TOS_VERSION
}

pub(crate) fn cluster_version() -> String {
    CLUSTER_VERSION.to_string()
}

pub(crate) const fn http_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

pub(crate) fn google_storage_root() -> String {
    GOOGLE_STORAGE_ROOT.to_string()
}

pub(crate) fn google_billing_root() -> String {
    GOOGLE_BILLING_ROOT.to_string()
}

pub(crate) fn zendesk_root() -> String {
    ZENDESK_ROOT.to_string()
}
