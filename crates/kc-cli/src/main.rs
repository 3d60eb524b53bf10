//! # kc-bridge
//!
//! Command-line access to the identity bridge.

#![forbid(unsafe_code)]

use clap::Parser;
use kc_cli::{
    cli::{Cli, Command},
    commands::{connect, run_endpoint, run_group, run_role, run_token, run_user},
    output::error,
    CliResult,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let bridge = connect(&cli.connection).await?;

    match cli.command {
        Command::Endpoint { admin } => run_endpoint(&bridge, admin, cli.output).await,
        Command::Token(cmd) => run_token(cmd, &bridge, cli.output).await,
        Command::User(cmd) => run_user(cmd, &bridge, cli.output).await,
        Command::Group(cmd) => run_group(cmd, &bridge, cli.output).await,
        Command::Role(cmd) => run_role(cmd, &bridge, cli.output).await,
    }
}
