//! # kc-cli
//!
//! The `kc-bridge` command-line tool.
//!
//! Exposes the identity bridge from the command line:
//! - Endpoint discovery
//! - Token exchange and organization token refresh
//! - User, group and realm role management, including role bindings and
//!   group membership

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
