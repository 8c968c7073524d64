//! Validation helpers for configuration values.

use url::Url;

use crate::defaults::MAX_HTTP_TIMEOUT_SECS;
use crate::error::{ConfigError, ConfigResult};

const SECTION_ENDPOINTS: &str = "endpoints";

/// Parse an endpoint root and return it in canonical form (no trailing slash).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an absolute
/// `http`/`https` URL, or carries a query string or fragment.
pub fn normalize_endpoint(field: &str, value: &str) -> ConfigResult<String> {
    let url = parse_endpoint(field, value)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Normalise an endpoint root and assign `port` when none was given.
///
/// A port written out explicitly is kept even when it is the scheme default.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the same reasons as
/// [`normalize_endpoint`].
pub fn normalize_endpoint_with_port(field: &str, value: &str, port: u16) -> ConfigResult<String> {
    let mut url = parse_endpoint(field, value)?;
    if url.port().is_none() && !has_explicit_port(value) {
        url.set_port(Some(port)).map_err(|()| {
            ConfigError::invalid(SECTION_ENDPOINTS, field, Some(value), "cannot carry a port")
        })?;
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Ensure a value can be sent verbatim as an HTTP header value.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for empty values or values with
/// control or non-ASCII characters.
pub fn validate_header_value(section: &str, field: &str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(section, field, Some(value), "must not be empty"));
    }
    if !value.bytes().all(|byte| byte == b' ' || byte.is_ascii_graphic()) {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(value),
            "must contain printable ASCII only",
        ));
    }
    Ok(())
}

/// Ensure the request timeout is within `1..=600` seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the timeout is out of range.
pub fn validate_timeout(secs: u64) -> ConfigResult<()> {
    if (1..=MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "http",
            "timeoutSecs",
            Some(&secs.to_string()),
            "must be between 1 and 600",
        ))
    }
}

/// `Url::port` hides scheme-default ports, so look at the authority as written.
fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.trim().split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let after_host = host_port.rsplit_once(']').map_or(host_port, |(_, tail)| tail);
    after_host
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|byte| byte.is_ascii_digit()))
}

fn parse_endpoint(field: &str, value: &str) -> ConfigResult<Url> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed).map_err(|_| {
        ConfigError::invalid(SECTION_ENDPOINTS, field, Some(value), "must be an absolute URL")
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            SECTION_ENDPOINTS,
            field,
            Some(value),
            "unsupported scheme",
        ));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::invalid(SECTION_ENDPOINTS, field, Some(value), "missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::invalid(
            SECTION_ENDPOINTS,
            field,
            Some(value),
            "must not carry a query or fragment",
        ));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_endpoint_trims_trailing_slash() {
        let value = normalize_endpoint("samUrlRoot", "https://sam.example.org/").expect("valid");
        assert_eq!(value, "https://sam.example.org");

        let nested = normalize_endpoint("rawlsUrlRoot", "https://example.org/rawls/").expect("valid");
        assert_eq!(nested, "https://example.org/rawls");
    }

    #[test]
    fn normalize_endpoint_rejects_bad_values() {
        for value in ["not a url", "ftp://files.example.org", "https://x.org/?a=1", "mailto:a@b"] {
            let err = normalize_endpoint("samUrlRoot", value).expect_err("should fail");
            assert!(matches!(err, ConfigError::InvalidField { .. }), "{value}");
        }
    }

    #[test]
    fn default_port_is_assigned_only_when_missing() {
        let assigned =
            normalize_endpoint_with_port("dockstoreUrlRoot", "https://dockstore.example.org", 8443)
                .expect("valid");
        assert_eq!(assigned, "https://dockstore.example.org:8443");

        let kept =
            normalize_endpoint_with_port("dockstoreUrlRoot", "http://127.0.0.1:5000", 8443)
                .expect("valid");
        assert_eq!(kept, "http://127.0.0.1:5000");
    }

    #[test]
    fn explicit_scheme_default_port_is_not_replaced() {
        let https =
            normalize_endpoint_with_port("dockstoreUrlRoot", "https://dockstore.example.org:443/", 8443)
                .expect("valid");
        assert_eq!(https, "https://dockstore.example.org");

        let http = normalize_endpoint_with_port("dockstoreUrlRoot", "http://[::1]:80", 8443)
            .expect("valid");
        assert_eq!(http, "http://[::1]");

        let bare_ipv6 = normalize_endpoint_with_port("dockstoreUrlRoot", "http://[::1]", 8443)
            .expect("valid");
        assert_eq!(bare_ipv6, "http://[::1]:8443");
    }

    #[test]
    fn header_values_must_be_printable() {
        assert!(validate_header_value("app", "appId", "Saturn").is_ok());
        assert!(validate_header_value("app", "appId", "").is_err());
        assert!(validate_header_value("app", "appId", "bad\nvalue").is_err());
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        assert!(validate_timeout(1).is_ok());
        assert!(validate_timeout(600).is_ok());
        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(601).is_err());
    }
}
