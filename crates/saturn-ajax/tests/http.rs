use std::sync::Arc;

use httpmock::prelude::*;
use saturn_ajax::{
    Ajax, AjaxError, ClientContext, MockSwitch, Session, Signal, TransportError,
};
use saturn_api_models::UploadFile;
use saturn_test_support::{TEST_APP_ID, config_for};
use serde_json::json;

fn context_for(server: &MockServer) -> anyhow::Result<ClientContext> {
    Ok(ClientContext::builder(config_for(&server.base_url()))
        .mock(Arc::new(MockSwitch::new()))
        .session(Session::signed_in("user-token"))
        .build()?)
}

#[tokio::test]
async fn rawls_requests_carry_session_and_app_headers() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/workspaces/ns/ws/methodconfigs")
            .query_param("allRepos", "true")
            .header("authorization", "Bearer user-token")
            .header("x-app-id", TEST_APP_ID);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([{ "name": "cfg" }]));
    });

    let ctx = context_for(&server)?;
    let signal = Signal::new();
    let configs = Ajax::new(&ctx, &signal)
        .workspaces
        .workspace("ns", "ws")
        .list_method_configs(true)
        .await?;

    mock.assert();
    assert_eq!(configs, Some(json!([{ "name": "cfg" }])));
    Ok(())
}

#[tokio::test]
async fn uploads_send_raw_bytes_with_the_pet_token() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let token = server.mock(|when, then| {
        when.method(POST)
            .path("/api/google/user/petServiceAccount/ns/token")
            .header("authorization", "Bearer user-token");
        then.status(200).json_body(json!("pet-token"));
    });
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/upload/storage/v1/b/bucket/o")
            .query_param("uploadType", "media")
            .query_param("name", "data/reads.txt")
            .header("authorization", "Bearer pet-token")
            .header("content-type", "text/plain")
            .body("ACGT");
        then.status(200).json_body(json!({ "name": "data/reads.txt" }));
    });

    let ctx = context_for(&server)?;
    let signal = Signal::new();
    let file = UploadFile {
        name: "reads.txt".to_string(),
        content_type: "text/plain".to_string(),
        contents: b"ACGT".to_vec(),
    };
    let response = Ajax::new(&ctx, &signal)
        .buckets
        .upload("ns", "bucket", "data/", &file)
        .await?;

    token.assert();
    upload.assert();
    assert_eq!(response.map(|response| response.status), Some(200));
    Ok(())
}

#[tokio::test]
async fn server_errors_keep_status_and_body() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(DELETE).path("/api/groups/v1/lab");
        then.status(403).body("not an admin");
    });

    let ctx = context_for(&server)?;
    let signal = Signal::new();
    let err = Ajax::new(&ctx, &signal)
        .groups
        .group("lab")
        .delete()
        .await
        .expect_err("403 should fail");

    let response = err.response().expect("status error");
    assert_eq!(response.status, 403);
    assert_eq!(response.text(), "not an admin");
    Ok(())
}

#[tokio::test]
async fn unreachable_hosts_are_network_errors() -> anyhow::Result<()> {
    let ctx = ClientContext::builder(config_for("http://127.0.0.1:9"))
        .mock(Arc::new(MockSwitch::new()))
        .session(Session::signed_in("user-token"))
        .build()?;
    let signal = Signal::new();
    let err = Ajax::new(&ctx, &signal)
        .workspaces
        .list()
        .await
        .expect_err("nothing listens on the discard port");

    assert!(matches!(
        err,
        AjaxError::Network {
            source: TransportError::Request { .. },
            ..
        }
    ));
    Ok(())
}
