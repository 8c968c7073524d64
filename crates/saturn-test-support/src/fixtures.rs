//! Configuration and payload fixtures.

use saturn_config::{ClientConfig, ServiceEndpoints};
use serde_json::{Value, json};

/// App id carried by [`config_for`] configurations.
pub const TEST_APP_ID: &str = "saturn-tests";

/// Configuration with every service rooted at `base_url`, typically a mock
/// server. Services stay distinguishable by their paths.
#[must_use]
pub fn config_for(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::with_endpoints(ServiceEndpoints::uniform(base_url));
    config.app.app_id = TEST_APP_ID.to_string();
    config.app.google_client_id = Some("client-123.apps.example.org".to_string());
    config.app.ui_origin = Some("https://saturn.example.org".to_string());
    config.http.timeout_secs = 5;
    config
}

/// Entity list in the shape served by public import sources.
#[must_use]
pub fn sample_entities() -> Value {
    json!([
        {
            "name": "sample-1",
            "entityType": "sample",
            "attributes": { "bam": "gs://bucket/s1.bam", "depth": 30 }
        },
        {
            "name": "participant-1",
            "entityType": "participant",
            "attributes": {}
        }
    ])
}

/// Profile keys as returned by the orchestration service.
#[must_use]
pub fn sample_profile() -> Value {
    json!({
        "keyValuePairs": [
            { "key": "firstName", "value": "Ada" },
            { "key": "lastName", "value": "Lovelace" }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturn_config::Endpoint;

    #[test]
    fn config_roots_every_service_at_base() {
        let config = config_for("http://127.0.0.1:9999");
        assert_eq!(config.endpoints.get(Endpoint::Sam), "http://127.0.0.1:9999");
        assert_eq!(config.endpoints.get(Endpoint::Zendesk), "http://127.0.0.1:9999");
        assert_eq!(config.app.app_id, TEST_APP_ID);
    }

    #[test]
    fn sample_entities_carry_types() {
        let entities = sample_entities();
        let types: Vec<&str> = entities
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|entity| entity["entityType"].as_str())
            .collect();
        assert_eq!(types, ["sample", "participant"]);
    }
}
