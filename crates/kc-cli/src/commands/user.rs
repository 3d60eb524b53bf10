//! User management commands.

use kc_admin_client::IdentityBridge;
use kc_model::UserRepresentation;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::UserCommand;
use crate::config::OutputFormat;
use crate::output::{confirm, error, output, output_single, prompt_password, success, Keyed};

use super::role::print_roles;

/// User representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct UserDisplay {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    #[tabled(rename = "First Name")]
    pub first_name: String,
    /// Last name.
    #[tabled(rename = "Last Name")]
    pub last_name: String,
    /// Whether the user is enabled.
    pub enabled: bool,
}

impl From<UserRepresentation> for UserDisplay {
    fn from(user: UserRepresentation) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            enabled: user.enabled,
        }
    }
}

impl Keyed for UserDisplay {
    fn key(&self) -> &str {
        &self.username
    }
}

#[derive(Serialize)]
struct UserDetails<'a> {
    id: &'a str,
    username: &'a str,
    email: &'a str,
}

/// Runs a user command.
pub async fn run_user(
    cmd: UserCommand,
    bridge: &IdentityBridge,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let directory = bridge.directory();

    match cmd {
        UserCommand::List => {
            let rows: Vec<UserDisplay> = directory
                .list_users()
                .await?
                .into_iter()
                .map(UserDisplay::from)
                .collect();
            output(&rows, format)
        }
        UserCommand::Create {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password(&format!("Password for {username}: "))?,
            };
            if password.is_empty() {
                return Err(crate::CliError::InvalidArgument(
                    "password must not be empty".to_string(),
                ));
            }
            directory
                .add_user(&username, &first_name, &last_name, &email, &password)
                .await?;
            success(&format!("User '{username}' created successfully"));
            Ok(())
        }
        UserCommand::Delete { username, force } => {
            if !force && !confirm(&format!("Are you sure you want to delete user '{username}'?"))? {
                error("Operation cancelled");
                return Ok(());
            }
            directory.delete_user(&username).await?;
            success(&format!("User '{username}' deleted successfully"));
            Ok(())
        }
        UserCommand::Details { id } => {
            let (username, email) = directory.fetch_user_details(&id).await?;
            let details = UserDetails {
                id: &id,
                username: &username,
                email: &email,
            };
            output_single(&details, &format!("{username} <{email}>"), format)
        }
        UserCommand::Roles {
            username,
            effective,
        } => {
            let roles = if effective {
                directory.user_effective_roles(&username).await?
            } else {
                directory.user_realm_roles(&username).await?
            };
            print_roles(roles, format)
        }
        UserCommand::AddRole {
            username,
            role,
            description,
        } => {
            directory
                .add_role_to_user(&username, &role, &description)
                .await?;
            success(&format!("Role '{role}' granted to user '{username}'"));
            Ok(())
        }
        UserCommand::RemoveRole {
            username,
            role,
            description,
        } => {
            directory
                .delete_role_from_user(&username, &role, &description)
                .await?;
            success(&format!("Role '{role}' revoked from user '{username}'"));
            Ok(())
        }
        UserCommand::JoinGroup { username, group } => {
            directory.add_group_to_user(&username, &group).await?;
            success(&format!("User '{username}' added to group '{group}'"));
            Ok(())
        }
    }
}
