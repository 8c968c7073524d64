use crate::cli::{GroupArgs, SetRolesArgs};
use crate::client::{AppContext, CliError, CliResult, settle};
use crate::output::{render_groups, render_members, render_role_change};

pub(crate) async fn handle_groups_list(ctx: &AppContext) -> CliResult<()> {
    let groups = settle(ctx.ajax().groups.list().await)?;
    render_groups(&groups, ctx.output)
}

pub(crate) async fn handle_group_members(ctx: &AppContext, args: GroupArgs) -> CliResult<()> {
    let ajax = ctx.ajax();
    let members = settle(ajax.groups.group(&args.group).list_users().await)?;
    render_members(&members, ctx.output)
}

pub(crate) async fn handle_set_roles(ctx: &AppContext, args: SetRolesArgs) -> CliResult<()> {
    if args.from.is_empty() && args.to.is_empty() {
        return Err(CliError::validation("pass --from and/or --to with at least one role"));
    }
    let ajax = ctx.ajax();
    let change = settle(
        ajax.groups
            .group(&args.group)
            .change_user_roles(&args.email, &args.from, &args.to)
            .await,
    )?;
    render_role_change(&args.email, &change, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::client::test_context;
    use httpmock::prelude::*;
    use saturn_api_models::GroupRole;
    use serde_json::json;

    #[tokio::test]
    async fn members_merge_both_role_lists() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let admins = server.mock(|when, then| {
            when.method(GET)
                .path("/api/groups/v1/lab/admin")
                .header("authorization", "Bearer cli-token");
            then.status(200).json_body(json!(["ada@example.org"]));
        });
        let members = server.mock(|when, then| {
            when.method(GET).path("/api/groups/v1/lab/member");
            then.status(200).json_body(json!(["bo@example.org"]));
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Json)?;
        handle_group_members(
            &ctx,
            GroupArgs {
                group: "lab".into(),
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        admins.assert();
        members.assert();
        Ok(())
    }

    #[tokio::test]
    async fn set_roles_grants_then_revokes() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let grant = server.mock(|when, then| {
            when.method(PUT).path("/api/groups/v1/lab/admin/ada@example.org");
            then.status(204);
        });
        let revoke = server.mock(|when, then| {
            when.method(DELETE).path("/api/groups/v1/lab/member/ada@example.org");
            then.status(204);
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        handle_set_roles(
            &ctx,
            SetRolesArgs {
                group: "lab".into(),
                email: "ada@example.org".into(),
                from: vec![GroupRole::Member],
                to: vec![GroupRole::Admin],
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        grant.assert();
        revoke.assert();
        Ok(())
    }

    #[tokio::test]
    async fn set_roles_requires_some_role() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        let err = handle_set_roles(
            &ctx,
            SetRolesArgs {
                group: "lab".into(),
                email: "ada@example.org".into(),
                from: Vec::new(),
                to: Vec::new(),
            },
        )
        .await
        .expect_err("no roles given");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn forbidden_listing_is_a_validation_error() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/groups/v1");
            then.status(403).body("not allowed");
        });

        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        let err = handle_groups_list(&ctx).await.expect_err("forbidden");
        assert!(matches!(
            err,
            CliError::Validation(ref message) if message.ends_with("not allowed")
        ));
        Ok(())
    }
}
