//! Realm role commands.

use kc_admin_client::IdentityBridge;
use kc_model::RoleRepresentation;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::RoleCommand;
use crate::config::OutputFormat;
use crate::output::{output, Keyed};

/// Role representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RoleDisplay {
    /// Role ID.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether the role aggregates other roles.
    pub composite: bool,
}

impl From<RoleRepresentation> for RoleDisplay {
    fn from(role: RoleRepresentation) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            composite: role.composite,
        }
    }
}

impl Keyed for RoleDisplay {
    fn key(&self) -> &str {
        &self.name
    }
}

/// Prints roles in the requested format.
pub fn print_roles(roles: Vec<RoleRepresentation>, format: OutputFormat) -> crate::CliResult<()> {
    let rows: Vec<RoleDisplay> = roles.into_iter().map(RoleDisplay::from).collect();
    output(&rows, format)
}

/// Runs a role command.
pub async fn run_role(
    cmd: RoleCommand,
    bridge: &IdentityBridge,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        RoleCommand::List => print_roles(bridge.directory().list_roles().await?, format),
    }
}
