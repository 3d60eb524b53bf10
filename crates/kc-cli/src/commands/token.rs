//! Token commands.

use kc_admin_client::{IdentityBridge, Token};
use serde::Serialize;

use crate::cli::TokenCommand;
use crate::config::OutputFormat;
use crate::output::{output_single, prompt_password};

#[derive(Serialize)]
struct TokenDisplay<'a> {
    username: &'a str,
    access_token: &'a str,
}

/// Runs a token command.
pub async fn run_token(
    cmd: TokenCommand,
    bridge: &IdentityBridge,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let tokens = bridge.tokens();

    let (username, token) = match cmd {
        TokenCommand::Exchange { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password(&format!("Password for {username}: "))?,
            };
            let token = tokens.exchange_token(&username, &password).await?;
            (username, token)
        }
        TokenCommand::Admin => (tokens.admin_username().to_string(), tokens.admin_token().await?),
        TokenCommand::Refresh => {
            let token = tokens.refreshed_admin_token().await?;
            tracing::info!(secret = %bridge.secrets().token_secret(), "Organization token refreshed");
            (tokens.admin_username().to_string(), token)
        }
    };

    print_token(&username, &token, format)
}

fn print_token(username: &str, token: &Token, format: OutputFormat) -> crate::CliResult<()> {
    let display = TokenDisplay {
        username,
        access_token: token.as_str(),
    };
    output_single(&display, token.as_str(), format)
}
