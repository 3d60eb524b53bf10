//! Endpoint command.

use kc_admin_client::{EndpointKind, IdentityBridge};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::output::output_single;

#[derive(Serialize)]
struct EndpointDisplay<'a> {
    kind: &'a str,
    url: &'a str,
}

/// Prints the resolved admin or public endpoint.
pub async fn run_endpoint(
    bridge: &IdentityBridge,
    admin: bool,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let kind = if admin {
        EndpointKind::Admin
    } else {
        EndpointKind::Public
    };
    let url = bridge.endpoints().resolve(kind).await?;

    let display = EndpointDisplay {
        kind: if admin { "admin" } else { "public" },
        url: &url,
    };
    output_single(&display, &url, format)
}
