//! User representation.

use serde::{Deserialize, Serialize};

use crate::credential::CredentialRepresentation;

/// A directory user.
///
/// The `id` is assigned by the IdP on creation and never changes afterwards;
/// `username` is unique within the realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// IdP-assigned identifier (empty until created).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Username, unique within the realm.
    #[serde(default)]
    pub username: String,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
    /// Whether the account is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Credentials to set on creation. Never returned by the IdP.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<CredentialRepresentation>,
}

impl UserRepresentation {
    /// Builds the creation payload for an enabled user with a permanent password.
    #[must_use]
    pub fn with_password(
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            enabled: true,
            credentials: vec![CredentialRepresentation::password(password)],
            ..Self::default()
        }
    }

    /// Returns `true` once the IdP serves both username and email.
    ///
    /// Freshly created users can be listed before these are populated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.email.is_empty()
    }
}
