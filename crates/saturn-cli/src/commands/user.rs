use crate::client::{AppContext, CliResult, settle};
use crate::output::{render_profile, render_tos};

pub(crate) async fn handle_tos(ctx: &AppContext) -> CliResult<()> {
    let accepted = settle(ctx.ajax().user.get_tos_accepted().await)?;
    render_tos(accepted, ctx.output)
}

pub(crate) async fn handle_profile(ctx: &AppContext) -> CliResult<()> {
    let profile = settle(ctx.ajax().user.profile_get().await)?;
    render_profile(&profile, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::client::test_context;
    use httpmock::prelude::*;
    use saturn_test_support::{TEST_APP_ID, sample_profile};
    use serde_json::json;

    #[tokio::test]
    async fn tos_queries_current_version() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let tos = server.mock(|when, then| {
            when.method(GET)
                .path("/user/response")
                .query_param("appid", TEST_APP_ID)
                .query_param("tosversion", "4");
            then.status(200).json_body(json!({ "accepted": true }));
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Json)?;
        handle_tos(&ctx)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        tos.assert();
        Ok(())
    }

    #[tokio::test]
    async fn profile_renders_key_value_pairs() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let profile = server.mock(|when, then| {
            when.method(GET)
                .path("/register/profile")
                .header("authorization", "Bearer cli-token")
                .header("x-app-id", TEST_APP_ID);
            then.status(200).json_body(sample_profile());
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        handle_profile(&ctx)
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        profile.assert();
        Ok(())
    }

    #[tokio::test]
    async fn tos_server_error_is_a_failure() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/user/response");
            then.status(500);
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        let err = handle_tos(&ctx).await.expect_err("server error");
        assert_eq!(err.exit_code(), 3);
        Ok(())
    }
}
