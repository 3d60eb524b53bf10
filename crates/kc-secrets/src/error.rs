//! Secret store error types.
//!
//! Messages name secrets and fields but never include their values.

use kc_core::SecretRef;
use thiserror::Error;

/// Secret store errors.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The secret object does not exist.
    #[error("secret {0} not found")]
    NotFound(SecretRef),

    /// The secret exists but lacks the requested field.
    #[error("secret {secret} has no field {field}")]
    MissingField {
        /// Secret that was read.
        secret: SecretRef,
        /// Missing field.
        field: String,
    },

    /// The field exists but is empty.
    #[error("field {field} of secret {secret} is empty")]
    EmptyField {
        /// Secret that was read.
        secret: SecretRef,
        /// Empty field.
        field: String,
    },

    /// The secret object cannot be addressed or holds non-UTF-8 data.
    #[error("invalid secret object: {0}")]
    InvalidObject(String),

    /// Kubernetes API failure.
    #[error("kubernetes error: {0}")]
    Kube(#[from] ::kube::Error),
}

/// Result type for secret store operations.
pub type SecretResult<T> = Result<T, SecretError>;
