//! Group management commands.

use kc_admin_client::IdentityBridge;
use kc_model::GroupRepresentation;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::GroupCommand;
use crate::config::OutputFormat;
use crate::output::{confirm, error, output, success, Keyed};

use super::role::print_roles;

/// Group representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct GroupDisplay {
    /// Group ID.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Path in the group hierarchy.
    pub path: String,
    /// Number of direct subgroups.
    #[tabled(rename = "Subgroups")]
    pub subgroups: usize,
}

impl From<GroupRepresentation> for GroupDisplay {
    fn from(group: GroupRepresentation) -> Self {
        Self {
            id: group.id,
            name: group.name,
            path: group.path,
            subgroups: group.sub_groups.len(),
        }
    }
}

impl Keyed for GroupDisplay {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Runs a group command.
pub async fn run_group(
    cmd: GroupCommand,
    bridge: &IdentityBridge,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let directory = bridge.directory();

    match cmd {
        GroupCommand::List => {
            let rows: Vec<GroupDisplay> = directory
                .list_groups()
                .await?
                .into_iter()
                .map(GroupDisplay::from)
                .collect();
            output(&rows, format)
        }
        GroupCommand::Create { name } => {
            directory.add_group(&name).await?;
            success(&format!("Group '{name}' created successfully"));
            Ok(())
        }
        GroupCommand::Delete { name, force } => {
            if !force && !confirm(&format!("Are you sure you want to delete group '{name}'?"))? {
                error("Operation cancelled");
                return Ok(());
            }
            directory.delete_group(&name).await?;
            success(&format!("Group '{name}' deleted successfully"));
            Ok(())
        }
        GroupCommand::Roles { name } => print_roles(directory.group_realm_roles(&name).await?, format),
        GroupCommand::AddRole {
            name,
            role,
            description,
        } => {
            directory
                .add_role_to_group(&name, &role, &description)
                .await?;
            success(&format!("Role '{role}' granted to group '{name}'"));
            Ok(())
        }
        GroupCommand::RemoveRole {
            name,
            role,
            description,
        } => {
            directory
                .delete_role_from_group(&name, &role, &description)
                .await?;
            success(&format!("Role '{role}' revoked from group '{name}'"));
            Ok(())
        }
    }
}
