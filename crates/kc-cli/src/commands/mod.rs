//! Command implementations.

pub mod endpoint;
pub mod group;
pub mod role;
pub mod token;
pub mod user;

use std::sync::Arc;

use kc_admin_client::IdentityBridge;
use kc_secrets::{KubeSecretStore, MemorySecretStore, SecretStore};

pub use endpoint::run_endpoint;
pub use group::run_group;
pub use role::run_role;
pub use token::run_token;
pub use user::run_user;

use crate::cli::ConnectionArgs;
use crate::config::bridge_config;
use crate::output::warning;

/// Connects to the secret store and assembles the identity bridge.
///
/// Without a reachable cluster the bridge still works when both the IdP
/// endpoint and the admin password are given explicitly; commands touching
/// the cached organization token then fail.
pub async fn connect(args: &ConnectionArgs) -> crate::CliResult<IdentityBridge> {
    let config = bridge_config(args)?;

    let store: Arc<dyn SecretStore> = match KubeSecretStore::try_default().await {
        Ok(store) => Arc::new(store),
        Err(e) if config.ui_endpoint.is_some() && args.admin_password.is_some() => {
            warning(&format!("Kubernetes unavailable, secrets are not accessible: {e}"));
            Arc::new(MemorySecretStore::new())
        }
        Err(e) => return Err(e.into()),
    };

    let bridge = match args.admin_password.as_deref() {
        Some(password) => IdentityBridge::new(config, store, password)?,
        None => IdentityBridge::from_secret(config, store).await?,
    };
    Ok(bridge)
}
