//! Error taxonomy of the identity bridge.
//!
//! Every failure reaches the immediate caller unchanged. Only
//! [`DirectoryOperations::fetch_user_details`](crate::DirectoryOperations::fetch_user_details)
//! retries internally.

use kc_secrets::SecretError;
use thiserror::Error;

/// Identity bridge error.
#[derive(Debug, Error)]
pub enum IdpError {
    /// Malformed configuration, e.g. an endpoint override that is not a URL.
    #[error("configuration error: {0}")]
    Config(String),

    /// Endpoint discovery failed: the connection secret or its issuer field
    /// is missing or unusable.
    #[error("endpoint lookup failed: {0}")]
    Lookup(String),

    /// Token exchange failed (transport, non-2xx status or undecodable body).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Reading or writing a durable secret failed, or the cached token came
    /// back empty.
    #[error("storage error: {0}")]
    Storage(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The IdP answered with a non-2xx status.
    #[error("HTTP error: {status} - {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// A directory read failed or never became consistent.
    #[error("directory error: {message}")]
    Directory {
        /// What failed.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<Box<IdpError>>,
    },
}

impl IdpError {
    /// Creates a directory error without a cause.
    #[must_use]
    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a directory error wrapping `cause`.
    #[must_use]
    pub fn directory_caused_by(message: impl Into<String>, cause: Self) -> Self {
        Self::Directory {
            message: format!("{}: {cause}", message.into()),
            source: Some(Box::new(cause)),
        }
    }

    /// Maps a secret store failure during endpoint discovery.
    #[must_use]
    pub fn lookup(err: &SecretError) -> Self {
        Self::Lookup(err.to_string())
    }

    /// Maps a secret store failure on the admin secrets.
    #[must_use]
    pub fn storage(err: &SecretError) -> Self {
        Self::Storage(err.to_string())
    }

    /// Wraps request and decoding failures of a directory read.
    ///
    /// Authentication, configuration and lookup errors pass through.
    #[must_use]
    pub fn into_directory(self, context: &str) -> Self {
        match self {
            Self::Transport(_) | Self::HttpStatus { .. } => {
                Self::directory_caused_by(context, self)
            }
            other => other,
        }
    }

    /// Returns the HTTP status if the IdP rejected the request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Checks if this is an authentication error.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Checks if this is a storage error.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Checks if this is a directory error.
    #[must_use]
    pub const fn is_directory_error(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Checks if the request failed in transit or was rejected by status.
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }
}

/// Result type for identity bridge operations.
pub type IdpResult<T> = Result<T, IdpError>;
