use saturn_api_models::Attributes;

use crate::cli::{SetAttributesArgs, WorkspaceArgs};
use crate::client::{AppContext, CliResult, settle};
use crate::output::{render_workspace_details, render_workspaces};

pub(crate) async fn handle_workspaces_list(ctx: &AppContext) -> CliResult<()> {
    let workspaces = settle(ctx.ajax().workspaces.list().await)?;
    render_workspaces(&workspaces, ctx.output)
}

pub(crate) async fn handle_workspace_details(ctx: &AppContext, args: WorkspaceArgs) -> CliResult<()> {
    let ajax = ctx.ajax();
    let details = settle(
        ajax.workspaces
            .workspace(&args.namespace, &args.name)
            .details()
            .await,
    )?;
    render_workspace_details(&details, ctx.output)
}

pub(crate) async fn handle_set_attributes(ctx: &AppContext, args: SetAttributesArgs) -> CliResult<()> {
    let count = args.attributes.len();
    let attributes: Attributes = args.attributes.into_iter().collect();
    let ajax = ctx.ajax();
    settle(
        ajax.workspaces
            .workspace(&args.namespace, &args.name)
            .shallow_merge_new_attributes(&attributes)
            .await,
    )?;
    println!(
        "Updated {count} attribute(s) on {}/{}.",
        args.namespace, args.name
    );
    Ok(())
}
