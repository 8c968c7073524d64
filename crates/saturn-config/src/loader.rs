//! Loading of the runtime configuration document.
//!
//! # Design
//! - The document is the deployment's `config.json`; every value it omits
//!   falls back to `defaults.rs`.
//! - Environment overrides are read through an injected lookup so callers
//!   (and tests) decide where values come from.
//! - Every entry point finishes with [`ClientConfig::normalize`], so a
//!   returned configuration is always validated.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::defaults::{DOCKSTORE_PORT, ENV_PREFIX};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ClientConfig, Endpoint};
use crate::validate::{
    normalize_endpoint, normalize_endpoint_with_port, validate_header_value, validate_timeout,
};

impl ClientConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::InvalidField`] for values that fail validation.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let mut config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.normalize()?;
        Ok(config)
    }

    /// Read, parse and validate the configuration document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`ClientConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "loaded client configuration");
        Ok(config)
    }

    /// Apply `SATURN_*` overrides resolved through `lookup`, then re-validate.
    ///
    /// Recognised keys: `SATURN_<ENDPOINT>_URL` for every [`Endpoint`],
    /// `SATURN_APP_ID`, `SATURN_GOOGLE_CLIENT_ID`, `SATURN_UI_ORIGIN` and
    /// `SATURN_HTTP_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when an override is malformed.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for endpoint in Endpoint::ALL {
            let key = endpoint.env_key();
            if let Some(value) = lookup(&key) {
                debug!(key = %key, "applying endpoint override");
                *self.endpoints.get_mut(endpoint) = value;
            }
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}APP_ID")) {
            self.app.app_id = value;
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}GOOGLE_CLIENT_ID")) {
            self.app.google_client_id = Some(value);
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}UI_ORIGIN")) {
            self.app.ui_origin = Some(value);
        }
        let timeout_key = format!("{ENV_PREFIX}HTTP_TIMEOUT_SECS");
        if let Some(value) = lookup(&timeout_key) {
            self.http.timeout_secs = value.trim().parse().map_err(|_| {
                ConfigError::invalid("http", &timeout_key, Some(&value), "must be an integer")
            })?;
        }
        self.normalize()
    }

    /// Validate every field and bring endpoint roots into canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for the first invalid field.
    pub fn normalize(&mut self) -> ConfigResult<()> {
        for endpoint in Endpoint::ALL {
            let field = endpoint.config_key();
            let slot = self.endpoints.get_mut(endpoint);
            *slot = if endpoint == Endpoint::Dockstore {
                normalize_endpoint_with_port(field, slot.as_str(), DOCKSTORE_PORT)?
            } else {
                normalize_endpoint(field, slot.as_str())?
            };
        }
        if let Some(origin) = self.app.ui_origin.as_mut() {
            *origin = normalize_endpoint("uiOrigin", origin.as_str())?;
        }
        validate_header_value("app", "appId", &self.app.app_id)?;
        validate_timeout(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"{
        "samUrlRoot": "https://sam.example.org/",
        "rawlsUrlRoot": "https://rawls.example.org",
        "leoUrlRoot": "https://leo.example.org",
        "dockstoreUrlRoot": "https://dockstore.example.org",
        "agoraUrlRoot": "https://agora.example.org",
        "orchestrationUrlRoot": "https://firecloud.example.org",
        "rexUrlRoot": "https://rex.example.org",
        "tosUrlRoot": "https://tos.example.org",
        "calhounUrlRoot": "https://calhoun.example.org",
        "marthaUrlRoot": "https://martha.example.org/martha_v2"
    }"#;

    #[test]
    fn minimal_document_gets_defaults() {
        let config = ClientConfig::from_json_str(MINIMAL).expect("valid config");
        assert_eq!(config.endpoints.sam, "https://sam.example.org");
        assert_eq!(config.endpoints.dockstore, "https://dockstore.example.org:8443");
        assert_eq!(config.endpoints.google_storage, "https://www.googleapis.com");
        assert_eq!(
            config.endpoints.google_billing,
            "https://cloudbilling.googleapis.com/v1"
        );
        assert_eq!(config.app.app_id, "Saturn");
        assert_eq!(config.app.tos_version, 4);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn missing_endpoint_is_a_parse_error() {
        let err = ClientConfig::from_json_str(r#"{"samUrlRoot": "https://sam.example.org"}"#)
            .expect_err("incomplete document");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_replace_values_and_revalidate() {
        let mut config = ClientConfig::from_json_str(MINIMAL).expect("valid config");
        let overrides: HashMap<&str, &str> = HashMap::from([
            ("SATURN_SAM_URL", "http://localhost:8080/"),
            ("SATURN_APP_ID", "Saturn-dev"),
            ("SATURN_HTTP_TIMEOUT_SECS", "5"),
        ]);
        config
            .apply_env_overrides(|key| overrides.get(key).map(|value| (*value).to_string()))
            .expect("overrides apply");
        assert_eq!(config.endpoints.sam, "http://localhost:8080");
        assert_eq!(config.app.app_id, "Saturn-dev");
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn malformed_timeout_override_is_rejected() {
        let mut config = ClientConfig::from_json_str(MINIMAL).expect("valid config");
        let err = config
            .apply_env_overrides(|key| (key == "SATURN_HTTP_TIMEOUT_SECS").then(|| "soon".into()))
            .expect_err("non-numeric timeout");
        assert!(matches!(err, ConfigError::InvalidField { reason: "must be an integer", .. }));
    }
}
