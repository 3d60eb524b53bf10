//! CLI configuration.

use kc_core::BridgeConfig;
use serde::{Deserialize, Serialize};

use crate::cli::ConnectionArgs;

/// Builds the bridge configuration from connection flags.
///
/// Flags already carry their environment fallbacks, so unset flags keep the
/// built-in defaults. Blank values count as unset.
pub fn bridge_config(args: &ConnectionArgs) -> crate::CliResult<BridgeConfig> {
    let mut config = BridgeConfig::default();

    config.ui_endpoint = non_blank(args.ui_url.as_deref());
    if let Some(namespace) = non_blank(args.namespace.as_deref()) {
        config.set_namespace(namespace);
    }
    if let Some(secret) = non_blank(args.oidc_secret.as_deref()) {
        config.oidc_secret_name = secret;
    }

    config
        .validate()
        .map_err(|e| crate::CliError::Config(e.to_string()))?;
    Ok(config)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
    /// Only primary identifiers, one per line.
    Quiet,
}
