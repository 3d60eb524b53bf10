//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Identity bridge CLI - directory and token administration against the
/// control plane's Keycloak.
#[derive(Debug, Parser)]
#[command(name = "kc-bridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Connection settings.
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Where the IdP and its secrets live.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Explicit IdP endpoint, bypassing discovery through the OIDC secret.
    #[arg(long, env = "PX_CENTRAL_UI_URL", global = true)]
    pub ui_url: Option<String>,

    /// Namespace the control plane runs in.
    #[arg(short, long, env = "PX_BACKUP_NAMESPACE", global = true)]
    pub namespace: Option<String>,

    /// Secret holding the IdP connection details.
    #[arg(long, env = "SECRET_NAME", global = true)]
    pub oidc_secret: Option<String>,

    /// Administrative password. Read from the admin credential secret when
    /// omitted.
    #[arg(long, env = "PX_CENTRAL_ADMIN_PASSWORD", global = true, hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved IdP endpoint.
    Endpoint {
        /// Print the admin endpoint instead of the public one.
        #[arg(long)]
        admin: bool,
    },

    /// Token commands.
    #[command(subcommand)]
    Token(TokenCommand),

    /// User management commands.
    #[command(subcommand)]
    User(UserCommand),

    /// Group management commands.
    #[command(subcommand)]
    Group(GroupCommand),

    /// Realm role commands.
    #[command(subcommand)]
    Role(RoleCommand),
}

/// Token commands.
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Exchange a username and password for a token.
    Exchange {
        /// Username.
        #[arg(short, long)]
        username: String,

        /// Password (will prompt if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Obtain a token for the administrative identity.
    Admin,

    /// Refresh the cached organization token and print it.
    Refresh,
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users.
    List,

    /// Create a user with a permanent password.
    Create {
        /// Username.
        username: String,

        /// Email address.
        #[arg(long)]
        email: String,

        /// First name.
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name.
        #[arg(long, default_value = "")]
        last_name: String,

        /// Password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a user.
    Delete {
        /// Username.
        username: String,

        /// Skip confirmation.
        #[arg(long)]
        force: bool,
    },

    /// Show username and email of a user id, waiting for a fresh user to
    /// become fully visible.
    Details {
        /// User ID.
        id: String,
    },

    /// List realm roles of a user.
    Roles {
        /// Username.
        username: String,

        /// Include roles inherited through composites and groups.
        #[arg(long)]
        effective: bool,
    },

    /// Grant a realm role to a user.
    AddRole {
        /// Username.
        username: String,

        /// Role name.
        role: String,

        /// Description sent with the mapping.
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Revoke a realm role from a user.
    RemoveRole {
        /// Username.
        username: String,

        /// Role name.
        role: String,

        /// Description sent with the mapping.
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Add a user to a group.
    JoinGroup {
        /// Username.
        username: String,

        /// Group name.
        group: String,
    },
}

/// Group commands.
#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// List groups.
    List,

    /// Create a group.
    Create {
        /// Group name.
        name: String,
    },

    /// Delete a group.
    Delete {
        /// Group name.
        name: String,

        /// Skip confirmation.
        #[arg(long)]
        force: bool,
    },

    /// List realm roles of a group.
    Roles {
        /// Group name.
        name: String,
    },

    /// Grant a realm role to a group.
    AddRole {
        /// Group name.
        name: String,

        /// Role name.
        role: String,

        /// Description sent with the mapping.
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Revoke a realm role from a group.
    RemoveRole {
        /// Group name.
        name: String,

        /// Role name.
        role: String,

        /// Description sent with the mapping.
        #[arg(long, default_value = "")]
        description: String,
    },
}

/// Realm role commands.
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List realm roles.
    List,
}
