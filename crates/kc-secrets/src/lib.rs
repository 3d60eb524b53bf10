//! # kc-secrets
//!
//! Durable secret storage for the identity bridge.
//!
//! The bridge keeps two pieces of state outside the process:
//!
//! 1. the administrative identity's password, in the admin credential secret
//! 2. a long-lived organization token, cached in the admin token secret
//!
//! Both live in namespaced secret objects reached through the
//! [`SecretStore`] trait. [`KubeSecretStore`] talks to a Kubernetes API
//! server; [`MemorySecretStore`] keeps everything in process.
//! [`SecretBridge`] reads and writes the two secrets above.
//!
//! ## Concurrency
//!
//! Updates are plain read-modify-write replacements without a
//! compare-and-swap precondition: two concurrent writers of the same secret
//! race and the last write wins. Writers that need a consistent value must be
//! serialized by the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod error;
pub mod kubernetes;
pub mod memory;
pub mod store;

pub use bridge::SecretBridge;
pub use error::{SecretError, SecretResult};
pub use kubernetes::KubeSecretStore;
pub use memory::MemorySecretStore;
pub use store::{read_field, secret_ref_of, write_field, SecretStore};

pub use k8s_openapi::api::core::v1::Secret;
