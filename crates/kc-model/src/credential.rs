//! Credential representation.

use serde::{Deserialize, Serialize};

/// Credential type for a plain password.
pub const PASSWORD_CREDENTIAL: &str = "password";

/// A credential embedded in a user creation payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRepresentation {
    /// Credential type (`password`).
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Whether the user must change the credential on first login.
    #[serde(default)]
    pub temporary: bool,
    /// Credential value.
    #[serde(default)]
    pub value: String,
}

impl CredentialRepresentation {
    /// Creates a non-temporary password credential.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            credential_type: PASSWORD_CREDENTIAL.to_string(),
            temporary: false,
            value: value.into(),
        }
    }
}

// Never print the credential value.
impl std::fmt::Debug for CredentialRepresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRepresentation")
            .field("credential_type", &self.credential_type)
            .field("temporary", &self.temporary)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
