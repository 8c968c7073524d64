//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use saturn_ajax::{MockMode, RoleChange};
use saturn_api_models::{BucketObject, GroupMember, GroupRole};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const NOTEBOOK_PREFIX: &str = "notebooks/";
const NOTEBOOK_EXTENSION: &str = ".ipynb";

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

fn text_field<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or("-")
}

pub(crate) fn render_groups(groups: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(groups),
        OutputFormat::Table => {
            println!("{:<32} {:<8} EMAIL", "NAME", "ROLE");
            for group in groups.as_array().into_iter().flatten() {
                println!(
                    "{:<32} {:<8} {}",
                    text_field(group, "/groupName"),
                    text_field(group, "/role"),
                    text_field(group, "/groupEmail")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_members(members: &[GroupMember], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(members),
        OutputFormat::Table => {
            println!("{:<40} ROLES", "EMAIL");
            for member in members {
                println!("{:<40} {}", member.email, join_roles(&member.roles));
            }
            Ok(())
        }
    }
}

pub(crate) fn render_role_change(
    email: &str,
    change: &RoleChange<GroupRole>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "email": email,
            "added": change.added,
            "removed": change.removed,
        })),
        OutputFormat::Table => {
            if change.is_empty() {
                println!("{email}: roles unchanged");
            } else {
                println!(
                    "{email}: added [{}], removed [{}]",
                    join_roles(&change.added),
                    join_roles(&change.removed)
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_workspaces(workspaces: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(workspaces),
        OutputFormat::Table => {
            println!("{:<10} {:<24} NAME", "ACCESS", "NAMESPACE");
            for entry in workspaces.as_array().into_iter().flatten() {
                println!(
                    "{:<10} {:<24} {}",
                    text_field(entry, "/accessLevel"),
                    text_field(entry, "/workspace/namespace"),
                    text_field(entry, "/workspace/name")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_workspace_details(details: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(details),
        OutputFormat::Table => {
            println!(
                "workspace: {}/{}",
                text_field(details, "/workspace/namespace"),
                text_field(details, "/workspace/name")
            );
            println!("access: {}", text_field(details, "/accessLevel"));
            println!("bucket: {}", text_field(details, "/workspace/bucketName"));
            println!("created by: {}", text_field(details, "/workspace/createdBy"));
            if let Some(attributes) = details
                .pointer("/workspace/attributes")
                .and_then(Value::as_object)
            {
                for (name, value) in attributes {
                    println!("  {name} = {value}");
                }
            }
            Ok(())
        }
    }
}

/// Notebook display name: object name without folder and extension.
pub(crate) fn notebook_name(object: &BucketObject) -> &str {
    let name = object.name.strip_prefix(NOTEBOOK_PREFIX).unwrap_or(&object.name);
    name.strip_suffix(NOTEBOOK_EXTENSION).unwrap_or(name)
}

pub(crate) fn render_notebooks(notebooks: &[BucketObject], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(notebooks),
        OutputFormat::Table => {
            println!("{:<40} {:>10} UPDATED", "NAME", "SIZE");
            for notebook in notebooks {
                let size = notebook
                    .metadata
                    .get("size")
                    .and_then(Value::as_str)
                    .and_then(|size| size.parse::<u64>().ok())
                    .map_or_else(|| "-".to_string(), format_bytes);
                let updated = notebook
                    .metadata
                    .get("updated")
                    .and_then(Value::as_str)
                    .unwrap_or("-");
                println!("{:<40} {size:>10} {updated}", notebook_name(notebook));
            }
            Ok(())
        }
    }
}

pub(crate) fn render_tos(accepted: bool, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "accepted": accepted })),
        OutputFormat::Table => {
            let state = if accepted { "accepted" } else { "not accepted" };
            println!("terms of service: {state}");
            Ok(())
        }
    }
}

pub(crate) fn render_profile(profile: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Table => {
            let pairs = profile
                .get("keyValuePairs")
                .and_then(Value::as_array)
                .ok_or_else(|| CliError::failure(anyhow!("profile has no keyValuePairs")))?;
            for pair in pairs {
                println!("{:<28} {}", text_field(pair, "/key"), text_field(pair, "/value"));
            }
            Ok(())
        }
    }
}

pub(crate) fn render_mock_mode(mode: &MockMode, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let value = match mode {
                MockMode::Off => json!({ "mode": "off" }),
                MockMode::NoConnection => json!({ "mode": "no-connection" }),
                MockMode::Respond { status, body } => {
                    json!({ "mode": "respond", "status": status, "body": body })
                }
            };
            print_json(&value)
        }
        OutputFormat::Table => {
            println!("{}", mode.describe());
            Ok(())
        }
    }
}

fn join_roles(roles: &[GroupRole]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn byte_counts_use_binary_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn notebook_names_drop_folder_and_extension() {
        let object = BucketObject {
            name: "notebooks/My Analysis.ipynb".to_string(),
            metadata: Map::new(),
        };
        assert_eq!(notebook_name(&object), "My Analysis");
    }

    #[test]
    fn renderers_accept_both_formats() {
        let members = [GroupMember {
            email: "ada@example.org".to_string(),
            roles: vec![GroupRole::Admin],
        }];
        assert!(render_members(&members, OutputFormat::Table).is_ok());
        assert!(render_members(&members, OutputFormat::Json).is_ok());
        assert!(render_mock_mode(&MockMode::NoConnection, OutputFormat::Json).is_ok());
        assert!(render_profile(&json!({}), OutputFormat::Table).is_err());
    }
}
