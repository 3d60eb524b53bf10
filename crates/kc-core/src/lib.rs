//! # kc-core
//!
//! Core configuration, error handling and retry primitives for the Keycloak
//! identity bridge.
//!
//! This crate provides foundational types used by every other crate in the
//! workspace:
//!
//! - [`config`] - environment-driven [`BridgeConfig`] with fixed defaults
//! - [`error`] - configuration errors
//! - [`retry`] - a fixed-interval, fixed-deadline retry combinator used to
//!   ride out the identity provider's read-after-write lag

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod retry;

pub use config::{BridgeConfig, SecretRef};
pub use error::{Error, Result};
pub use retry::{retry_until_deadline, RetryError, RetryPolicy};
