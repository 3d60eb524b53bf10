//! # kc-model
//!
//! Directory representations exchanged with the identity provider's admin
//! REST API.
//!
//! Every type mirrors the JSON shape the IdP emits and accepts
//! (camelCase field names). Decoding is lenient: absent fields fall back to
//! their defaults and unknown fields are ignored, because list endpoints
//! return richer records than this bridge needs.
//!
//! ## Types
//!
//! - [`UserRepresentation`] / [`CredentialRepresentation`] - users and their
//!   initial password
//! - [`GroupRepresentation`] / [`GroupMembership`] - groups and user membership
//! - [`RoleRepresentation`] / [`RoleBinding`] - realm roles and their
//!   assignment to users or groups

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod group;
pub mod role;
pub mod user;

pub use credential::{CredentialRepresentation, PASSWORD_CREDENTIAL};
pub use group::{GroupCreate, GroupMembership, GroupRepresentation};
pub use role::{roles, Principal, RoleBinding, RoleComposites, RoleRepresentation};
pub use user::UserRepresentation;
