//! Command-line client for the Saturn backend services.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use saturn_ajax::{ClientContext, MockMode, MockSwitch, Session, Signal, ViewScope};
use saturn_api_models::GroupRole;
use saturn_config::ClientConfig;
use saturn_telemetry::{LogFormat, LoggingConfig, init_logging};
use serde_json::Value;
use tracing::{Instrument, Span, info, info_span, warn};
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult};
use crate::commands::groups::{handle_group_members, handle_groups_list, handle_set_roles};
use crate::commands::notebooks::{
    handle_notebook_delete, handle_notebook_rename, handle_notebooks_list,
};
use crate::commands::user::{handle_profile, handle_tos};
use crate::commands::workspaces::{
    handle_set_attributes, handle_workspace_details, handle_workspaces_list,
};
use crate::output::render_mock_mode;

const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command and reports the
/// outcome. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: LogFormat::infer(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging unavailable: {err}");
    }

    let span = command_span(&cli.command, Uuid::new_v4());
    match dispatch(cli).instrument(span).await {
        Ok(()) => 0,
        Err(CliError::Cancelled) => {
            info!("command cancelled");
            CliError::Cancelled.exit_code()
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let mock = MockSwitch::global();
    mock.set(cli.simulate.clone());
    if matches!(cli.command, Command::Mock) {
        return render_mock_mode(&mock.currently(), cli.output);
    }

    let config = load_config(cli.config.as_deref())?;
    let session = cli.token.map_or_else(Session::new, Session::signed_in);
    let client = ClientContext::builder(config)
        .mock(mock)
        .session(session)
        .build()
        .map_err(CliError::failure)?;

    let scope = ViewScope::new();
    let watcher = tokio::spawn(cancel_on_interrupt(scope.signal()));
    let ctx = AppContext {
        client,
        signal: scope.signal(),
        output: cli.output,
    };
    let result = execute(&ctx, cli.command).await;
    watcher.abort();
    result
}

pub(crate) async fn execute(ctx: &AppContext, command: Command) -> CliResult<()> {
    match command {
        Command::Groups(groups) => match groups {
            GroupsCommand::List => handle_groups_list(ctx).await,
            GroupsCommand::Members(args) => handle_group_members(ctx, args).await,
            GroupsCommand::SetRoles(args) => handle_set_roles(ctx, args).await,
        },
        Command::Workspaces(workspaces) => match workspaces {
            WorkspacesCommand::List => handle_workspaces_list(ctx).await,
            WorkspacesCommand::Details(args) => handle_workspace_details(ctx, args).await,
            WorkspacesCommand::SetAttributes(args) => handle_set_attributes(ctx, args).await,
        },
        Command::Notebooks(notebooks) => match notebooks {
            NotebooksCommand::List(args) => handle_notebooks_list(ctx, args).await,
            NotebooksCommand::Rename(args) => handle_notebook_rename(ctx, args).await,
            NotebooksCommand::Delete(args) => handle_notebook_delete(ctx, args).await,
        },
        Command::User(user) => match user {
            UserCommand::Tos => handle_tos(ctx).await,
            UserCommand::Profile => handle_profile(ctx).await,
        },
        Command::Mock => render_mock_mode(&ctx.client.dispatcher().mock().currently(), ctx.output),
    }
}

async fn cancel_on_interrupt(signal: Signal) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received; cancelling outstanding requests");
        signal.cancel();
    }
}

fn load_config(path: Option<&Path>) -> CliResult<ClientConfig> {
    let path = path.ok_or_else(|| {
        CliError::validation("a configuration file is required (pass --config or set SATURN_CONFIG)")
    })?;
    let mut config =
        ClientConfig::load(path).map_err(|err| CliError::validation(format!("{err}")))?;
    config
        .apply_env_overrides(|key| std::env::var(key).ok())
        .map_err(|err| CliError::validation(format!("{err}")))?;
    Ok(config)
}

fn command_span(command: &Command, trace_id: Uuid) -> Span {
    info_span!(
        "command",
        %trace_id,
        version = env!("CARGO_PKG_VERSION"),
        command = command_label(command)
    )
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Groups(GroupsCommand::List) => "groups_list",
        Command::Groups(GroupsCommand::Members(_)) => "groups_members",
        Command::Groups(GroupsCommand::SetRoles(_)) => "groups_set_roles",
        Command::Workspaces(WorkspacesCommand::List) => "workspaces_list",
        Command::Workspaces(WorkspacesCommand::Details(_)) => "workspaces_details",
        Command::Workspaces(WorkspacesCommand::SetAttributes(_)) => "workspaces_set_attributes",
        Command::Notebooks(NotebooksCommand::List(_)) => "notebooks_list",
        Command::Notebooks(NotebooksCommand::Rename(_)) => "notebooks_rename",
        Command::Notebooks(NotebooksCommand::Delete(_)) => "notebooks_delete",
        Command::User(UserCommand::Tos) => "user_tos",
        Command::User(UserCommand::Profile) => "user_profile",
        Command::Mock => "mock",
    }
}

/// Parse `off`, `no-connection`, `malformed` or `status:<code>`.
pub(crate) fn parse_simulation(raw: &str) -> Result<MockMode, String> {
    let switch = MockSwitch::new();
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => {}
        "no-connection" => switch.no_connection(),
        "malformed" => switch.malformed(),
        other => {
            let code = other
                .strip_prefix("status:")
                .ok_or_else(|| format!("unknown simulation '{raw}'"))?;
            let code: u16 = code
                .parse()
                .map_err(|_| format!("invalid status code '{code}'"))?;
            if !(100..=599).contains(&code) {
                return Err(format!("status code {code} is out of range"));
            }
            switch.status(code);
        }
    }
    Ok(switch.mode())
}

/// Parse `name=value`; the value is JSON when it parses, a string otherwise.
pub(crate) fn parse_attribute(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("attribute name must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((name.to_string(), value))
}

#[derive(Parser)]
#[command(name = "saturn", about = "Drive the Saturn backend services from a terminal")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "SATURN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = "SATURN_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        value_parser = parse_simulation,
        default_value = "off",
        help = "Replace network I/O: off, no-connection, malformed or status:<code>"
    )]
    simulate: MockMode,
    #[arg(long, global = true, env = "SATURN_LOG_LEVEL", default_value = DEFAULT_CLI_LOG_LEVEL)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[command(subcommand)]
    Groups(GroupsCommand),
    #[command(subcommand)]
    Workspaces(WorkspacesCommand),
    #[command(subcommand)]
    Notebooks(NotebooksCommand),
    #[command(subcommand)]
    User(UserCommand),
    /// Print the effective simulation mode.
    Mock,
}

#[derive(Subcommand)]
pub(crate) enum GroupsCommand {
    List,
    Members(GroupArgs),
    SetRoles(SetRolesArgs),
}

#[derive(Subcommand)]
pub(crate) enum WorkspacesCommand {
    List,
    Details(WorkspaceArgs),
    SetAttributes(SetAttributesArgs),
}

#[derive(Subcommand)]
pub(crate) enum NotebooksCommand {
    List(BucketArgs),
    Rename(RenameArgs),
    Delete(NotebookArgs),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    /// Whether the current terms of service were accepted.
    Tos,
    Profile,
}

#[derive(Args)]
pub(crate) struct GroupArgs {
    pub(crate) group: String,
}

#[derive(Args)]
pub(crate) struct SetRolesArgs {
    pub(crate) group: String,
    pub(crate) email: String,
    /// Roles currently held, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub(crate) from: Vec<GroupRole>,
    /// Roles to hold afterwards, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub(crate) to: Vec<GroupRole>,
}

#[derive(Args)]
pub(crate) struct WorkspaceArgs {
    pub(crate) namespace: String,
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct SetAttributesArgs {
    pub(crate) namespace: String,
    pub(crate) name: String,
    #[arg(long = "attr", value_parser = parse_attribute, required = true)]
    pub(crate) attributes: Vec<(String, Value)>,
}

#[derive(Args)]
pub(crate) struct BucketArgs {
    pub(crate) namespace: String,
    pub(crate) bucket: String,
}

#[derive(Args)]
pub(crate) struct NotebookArgs {
    pub(crate) namespace: String,
    pub(crate) bucket: String,
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct RenameArgs {
    pub(crate) namespace: String,
    pub(crate) bucket: String,
    pub(crate) name: String,
    pub(crate) new_name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    use crate::client::test_context;

    #[test]
    fn command_span_carries_version_and_trace_id() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = command_span(&Command::Mock, Uuid::nil());
            let metadata = span.metadata().expect("span enabled");
            let fields = metadata.fields();
            assert!(fields.field("version").is_some());
            assert!(fields.field("trace_id").is_some());
            assert!(fields.field("command").is_some());
        });
    }

    #[test]
    fn simulation_modes_parse() {
        assert_eq!(parse_simulation("off"), Ok(MockMode::Off));
        assert_eq!(parse_simulation("No-Connection"), Ok(MockMode::NoConnection));
        assert_eq!(
            parse_simulation("malformed"),
            Ok(MockMode::Respond {
                status: 200,
                body: "{malformed".to_string()
            })
        );
        assert_eq!(
            parse_simulation("status:503"),
            Ok(MockMode::Respond {
                status: 503,
                body: "Body of simulated 503 response".to_string()
            })
        );
        assert!(parse_simulation("status:abc").is_err());
        assert!(parse_simulation("status:42").is_err());
        assert!(parse_simulation("flaky").is_err());
    }

    #[test]
    fn attributes_parse_json_or_text() {
        assert_eq!(parse_attribute("depth=30"), Ok(("depth".to_string(), json!(30))));
        assert_eq!(
            parse_attribute("tags=[\"a\",\"b\"]"),
            Ok(("tags".to_string(), json!(["a", "b"])))
        );
        assert_eq!(
            parse_attribute("description=RNA study"),
            Ok(("description".to_string(), json!("RNA study")))
        );
        assert!(parse_attribute("=1").is_err());
        assert!(parse_attribute("novalue").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommands() {
        let cli = Cli::try_parse_from([
            "saturn",
            "groups",
            "set-roles",
            "lab",
            "ada@example.org",
            "--from",
            "member",
            "--to",
            "admin,member",
            "--output",
            "json",
            "--simulate",
            "status:404",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "groups_set_roles");
        assert!(matches!(cli.simulate, MockMode::Respond { status: 404, .. }));
        let Command::Groups(GroupsCommand::SetRoles(args)) = cli.command else {
            panic!("expected set-roles");
        };
        assert_eq!(args.from, vec![GroupRole::Member]);
        assert_eq!(args.to, vec![GroupRole::Admin, GroupRole::Member]);
    }

    #[test]
    fn missing_config_is_a_validation_error() {
        let err = load_config(None).expect_err("config is required");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_file_is_loaded_and_validated() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        let roots = [
            "sam", "rawls", "leo", "dockstore", "agora", "orchestration", "rex", "tos", "calhoun",
            "martha",
        ];
        let document: serde_json::Map<String, Value> = roots
            .iter()
            .map(|name| (format!("{name}UrlRoot"), json!(format!("https://{name}.example.org"))))
            .collect();
        file.write_all(serde_json::to_string(&document)?.as_bytes())?;

        let config = load_config(Some(file.path()))
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(config.endpoints.dockstore, "https://dockstore.example.org:8443");

        let mut broken = tempfile::NamedTempFile::new()?;
        broken.write_all(b"{\"samUrlRoot\": 7}")?;
        let err = load_config(Some(broken.path())).expect_err("invalid document");
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_commands_report_cancellation() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        ctx.signal.cancel();

        let err = execute(&ctx, Command::Workspaces(WorkspacesCommand::List))
            .await
            .expect_err("signal already fired");
        assert!(matches!(err, CliError::Cancelled));
        Ok(())
    }

    #[tokio::test]
    async fn simulated_statuses_surface_as_validation_errors() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let ctx = test_context(&server.base_url(), OutputFormat::Table)?;
        ctx.client.dispatcher().mock().status(404);

        let err = execute(&ctx, Command::User(UserCommand::Profile))
            .await
            .expect_err("simulated 404");
        assert!(matches!(
            err,
            CliError::Validation(ref message) if message.contains("Body of simulated 404 response")
        ));
        assert!(execute(&ctx, Command::Mock).await.is_ok());
        Ok(())
    }
}
