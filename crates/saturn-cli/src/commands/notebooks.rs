use crate::cli::{BucketArgs, NotebookArgs, RenameArgs};
use crate::client::{AppContext, CliError, CliResult, settle};
use crate::output::render_notebooks;

pub(crate) async fn handle_notebooks_list(ctx: &AppContext, args: BucketArgs) -> CliResult<()> {
    let notebooks = settle(
        ctx.ajax()
            .buckets
            .list_notebooks(&args.namespace, &args.bucket)
            .await,
    )?;
    render_notebooks(&notebooks, ctx.output)
}

pub(crate) async fn handle_notebook_rename(ctx: &AppContext, args: RenameArgs) -> CliResult<()> {
    let new_name = args.new_name.trim();
    if new_name.is_empty() {
        return Err(CliError::validation("new notebook name must not be empty"));
    }
    if new_name == args.name {
        return Err(CliError::validation(
            "new notebook name must differ from the current one",
        ));
    }
    let ajax = ctx.ajax();
    settle(
        ajax.buckets
            .notebook(&args.namespace, &args.bucket, &args.name)
            .rename(new_name)
            .await,
    )?;
    println!("Renamed notebook {} to {new_name}.", args.name);
    Ok(())
}

pub(crate) async fn handle_notebook_delete(ctx: &AppContext, args: NotebookArgs) -> CliResult<()> {
    let ajax = ctx.ajax();
    settle(
        ajax.buckets
            .notebook(&args.namespace, &args.bucket, &args.name)
            .delete()
            .await,
    )?;
    println!("Deleted notebook {}.", args.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::client::test_context;
    use httpmock::prelude::*;
    use serde_json::json;

    fn pet_token(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/google/user/petServiceAccount/ns/token")
                .header("authorization", "Bearer cli-token");
            then.status(200).json_body(json!("pet-token"));
        })
    }

    #[tokio::test]
    async fn list_uses_pet_token_and_notebook_prefix() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let token = pet_token(&server);
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/fc-1/o")
                .query_param("prefix", "notebooks/")
                .header("authorization", "Bearer pet-token");
            then.status(200).json_body(json!({
                "items": [
                    { "name": "notebooks/Analysis.ipynb", "size": "2048" },
                    { "name": "notebooks/readme.txt" }
                ]
            }));
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        handle_notebooks_list(
            &ctx,
            BucketArgs {
                namespace: "ns".into(),
                bucket: "fc-1".into(),
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        token.assert();
        listing.assert();
        Ok(())
    }

    #[tokio::test]
    async fn rename_copies_then_deletes() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let token = pet_token(&server);
        let copy = server.mock(|when, then| {
            when.method(POST)
                .path_includes("/storage/v1/b/fc-1/o/notebooks")
                .path_includes("/copyTo/b/fc-1/o/")
                .header("authorization", "Bearer pet-token");
            then.status(200).json_body(json!({}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path_includes("/storage/v1/b/fc-1/o/notebooks")
                .header("authorization", "Bearer pet-token");
            then.status(204);
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        handle_notebook_rename(
            &ctx,
            RenameArgs {
                namespace: "ns".into(),
                bucket: "fc-1".into(),
                name: "Draft".into(),
                new_name: "Final".into(),
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        token.assert();
        copy.assert();
        delete.assert();
        Ok(())
    }

    #[tokio::test]
    async fn rename_to_same_name_is_rejected_locally() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        let err = handle_notebook_rename(
            &ctx,
            RenameArgs {
                namespace: "ns".into(),
                bucket: "fc-1".into(),
                name: "Draft".into(),
                new_name: "Draft".into(),
            },
        )
        .await
        .expect_err("same name");

        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn missing_notebook_reports_rejection() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        pet_token(&server);
        server.mock(|when, then| {
            when.method(DELETE).path_includes("/storage/v1/b/fc-1/o/");
            then.status(404).body("No such object");
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        let err = handle_notebook_delete(
            &ctx,
            NotebookArgs {
                namespace: "ns".into(),
                bucket: "fc-1".into(),
                name: "Gone".into(),
            },
        )
        .await
        .expect_err("not found");

        assert!(matches!(
            err,
            CliError::Validation(ref message) if message.contains("404")
        ));
        Ok(())
    }
}
