//! # kc-admin-client
//!
//! Token lifecycle and directory orchestration against a Keycloak identity
//! provider.
//!
//! ## Components
//!
//! - [`EndpointResolver`] - the realm's admin and public base URLs, from an
//!   explicit override or the OIDC connection secret
//! - [`TokenBroker`] - password-grant token exchange and the persisted admin
//!   organization token
//! - [`HttpTransport`] / [`IdentityClient`] - single requests with a fixed
//!   timeout, and their authenticated admin API wrapper
//! - [`DirectoryOperations`] - users, groups, realm roles and role bindings
//! - [`IdentityBridge`] - wires all of the above from a
//!   [`BridgeConfig`](kc_core::BridgeConfig)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use kc_admin_client::IdentityBridge;
//! use kc_core::BridgeConfig;
//! use kc_secrets::KubeSecretStore;
//!
//! let store = Arc::new(KubeSecretStore::try_default().await?);
//! let bridge = IdentityBridge::from_secret(BridgeConfig::from_env(), store).await?;
//!
//! bridge.directory().add_group("backup-operators").await?;
//! bridge
//!     .directory()
//!     .add_role_to_group("backup-operators", "px-backup-app.user", "operators")
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod client;
pub mod directory;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod token;

pub use bridge::IdentityBridge;
pub use client::IdentityClient;
pub use directory::DirectoryOperations;
pub use endpoint::{EndpointKind, EndpointResolver};
pub use error::{IdpError, IdpResult};
pub use http::HttpTransport;
pub use token::{Credential, OutgoingContext, Token, TokenBroker, AUTH_HEADER, AUTH_TOKEN_TYPE};
