//! Configuration management for the identity bridge.
//!
//! Every setting has a fixed default. Three of them can be overridden from the
//! process environment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `PX_CENTRAL_UI_URL` | explicit IdP endpoint, bypasses secret discovery |
//! | `PX_BACKUP_NAMESPACE` | namespace the control plane runs in |
//! | `SECRET_NAME` | secret holding the IdP connection details |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Environment variable holding the explicit IdP endpoint override.
pub const UI_ENDPOINT_ENV: &str = "PX_CENTRAL_UI_URL";
/// Environment variable holding the control-plane namespace.
pub const NAMESPACE_ENV: &str = "PX_BACKUP_NAMESPACE";
/// Environment variable holding the OIDC connection secret name.
pub const OIDC_SECRET_ENV: &str = "SECRET_NAME";

/// Default control-plane namespace.
pub const DEFAULT_NAMESPACE: &str = "px-backup";
/// Default OIDC connection secret name.
pub const DEFAULT_OIDC_SECRET_NAME: &str = "pxc-backup-secret";
/// Field of the OIDC secret holding the issuer URL.
pub const DEFAULT_ISSUER_FIELD: &str = "OIDC_ENDPOINT";
/// Username of the administrative identity.
pub const DEFAULT_ADMIN_USERNAME: &str = "px-central-admin";
/// Name of the secret holding the administrative password.
pub const DEFAULT_ADMIN_CREDENTIAL_SECRET: &str = "px-central-admin";
/// Field of the credential secret holding the administrative password.
pub const DEFAULT_ADMIN_PASSWORD_FIELD: &str = "credential";
/// Name of the secret caching the long-lived organization token.
pub const DEFAULT_ADMIN_TOKEN_SECRET: &str = "px-backup-admin-secret";
/// Namespace of the admin token secret. Not affected by `PX_BACKUP_NAMESPACE`.
pub const DEFAULT_ADMIN_TOKEN_NAMESPACE: &str = "px-backup";
/// Field of the admin token secret holding the cached token.
pub const DEFAULT_ADMIN_TOKEN_FIELD: &str = "PX_BACKUP_ORG_TOKEN";
/// OAuth2 client used for the password grant.
pub const DEFAULT_CLIENT_ID: &str = "pxcentral";
/// Requested token validity.
pub const DEFAULT_TOKEN_DURATION: &str = "365d";
/// The top-level realm every directory entity lives in.
pub const DEFAULT_REALM: &str = "master";
/// Per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Location of a namespaced secret object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretRef {
    /// Namespace of the secret.
    pub namespace: String,
    /// Name of the secret.
    pub name: String,
}

impl SecretRef {
    /// Creates a new secret reference.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for SecretRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Identity bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Explicit IdP endpoint (e.g. `http://10.0.0.1:31000`).
    ///
    /// When set, endpoint discovery through the OIDC secret is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_endpoint: Option<String>,
    /// Namespace the control plane (and its OIDC secret) lives in.
    pub namespace: String,
    /// Name of the secret holding the IdP connection details.
    pub oidc_secret_name: String,
    /// Field of the OIDC secret holding the issuer URL.
    pub issuer_field: String,
    /// Username of the administrative identity.
    pub admin_username: String,
    /// Secret holding the administrative password.
    pub admin_credential_secret: SecretRef,
    /// Field of [`Self::admin_credential_secret`] holding the password.
    pub admin_password_field: String,
    /// Secret caching the long-lived organization token.
    pub admin_token_secret: SecretRef,
    /// Field of [`Self::admin_token_secret`] holding the token.
    pub admin_token_field: String,
    /// OAuth2 client id used for the password grant.
    pub client_id: String,
    /// Token validity hint sent with every password grant.
    pub token_duration: String,
    /// Realm all directory entities live in.
    pub realm: String,
    /// Per-request HTTP timeout in seconds.
    pub http_timeout_secs: u64,
    /// Polling policy for reads that may lag behind writes.
    pub consistency: RetryPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ui_endpoint: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            oidc_secret_name: DEFAULT_OIDC_SECRET_NAME.to_string(),
            issuer_field: DEFAULT_ISSUER_FIELD.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_credential_secret: SecretRef::new(
                DEFAULT_NAMESPACE,
                DEFAULT_ADMIN_CREDENTIAL_SECRET,
            ),
            admin_password_field: DEFAULT_ADMIN_PASSWORD_FIELD.to_string(),
            admin_token_secret: SecretRef::new(
                DEFAULT_ADMIN_TOKEN_NAMESPACE,
                DEFAULT_ADMIN_TOKEN_SECRET,
            ),
            admin_token_field: DEFAULT_ADMIN_TOKEN_FIELD.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            token_duration: DEFAULT_TOKEN_DURATION.to_string(),
            realm: DEFAULT_REALM.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            consistency: RetryPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Loads configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.ui_endpoint = get(UI_ENDPOINT_ENV);
        if let Some(ns) = get(NAMESPACE_ENV) {
            config.set_namespace(ns);
        }
        if let Some(name) = get(OIDC_SECRET_ENV) {
            config.oidc_secret_name = name;
        }
        config
    }

    /// Sets the control-plane namespace.
    ///
    /// The admin credential secret follows the control-plane namespace; the
    /// admin token secret does not.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.admin_credential_secret.namespace = namespace.clone();
        self.namespace = namespace;
    }

    /// Returns the secret holding the IdP connection details.
    #[must_use]
    pub fn oidc_secret(&self) -> SecretRef {
        SecretRef::new(&self.namespace, &self.oidc_secret_name)
    }

    /// Returns the per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("namespace", &self.namespace),
            ("oidc_secret_name", &self.oidc_secret_name),
            ("issuer_field", &self.issuer_field),
            ("admin_username", &self.admin_username),
            ("admin_password_field", &self.admin_password_field),
            ("admin_token_field", &self.admin_token_field),
            ("client_id", &self.client_id),
            ("realm", &self.realm),
            ("admin_credential_secret.name", &self.admin_credential_secret.name),
            ("admin_token_secret.name", &self.admin_token_secret.name),
            ("admin_token_secret.namespace", &self.admin_token_secret.namespace),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{key} must not be empty")));
            }
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::config("http_timeout_secs must be positive"));
        }
        self.consistency.validate()
    }
}
