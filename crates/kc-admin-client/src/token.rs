//! Token lifecycle.
//!
//! Two tiers of tokens exist:
//!
//! - ephemeral tokens from [`TokenBroker::exchange_token`], obtained per
//!   request and never stored
//! - the admin organization token from
//!   [`TokenBroker::refreshed_admin_token`], persisted in the admin token
//!   secret for other components to pick up
//!
//! Neither tier tracks expiry locally; every token is requested with a
//! 365-day validity hint.

use std::collections::BTreeMap;
use std::sync::Arc;

use kc_core::BridgeConfig;
use kc_secrets::SecretBridge;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::endpoint::EndpointResolver;
use crate::error::{IdpError, IdpResult};
use crate::http::HttpTransport;

/// Metadata key carrying the bearer token.
pub const AUTH_HEADER: &str = "authorization";
/// Token type prefix of [`AUTH_HEADER`].
pub const AUTH_TOKEN_TYPE: &str = "bearer";

/// Username and password for a password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    password: String,
}

impl Credential {
    /// Creates a credential.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wraps a raw token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token(len={})", self.0.len())
    }
}

/// Request metadata carrying a bearer token to downstream services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingContext {
    metadata: BTreeMap<String, String>,
}

impl OutgoingContext {
    /// Returns a metadata value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns the `authorization` value.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.get(AUTH_HEADER)
    }

    /// Iterates over all metadata entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts the metadata into HTTP headers.
    pub fn to_header_map(&self) -> IdpResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.metadata {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| IdpError::Config(format!("invalid metadata key {key:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| IdpError::Config(format!("invalid metadata value for {key:?}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtains bearer tokens from the IdP and persists the admin token.
///
/// The admin credential is fixed at construction. To pick up a password from
/// the admin credential secret, derive a new broker with
/// [`TokenBroker::with_admin_password_from_secret`].
///
/// Clones share one refresh lock, so [`TokenBroker::refreshed_admin_token`]
/// calls through clones of the same broker never interleave. Brokers built
/// independently (or running in other processes) do not coordinate: their
/// refreshes overwrite each other in the secret store.
#[derive(Clone)]
pub struct TokenBroker {
    transport: HttpTransport,
    endpoints: EndpointResolver,
    secrets: SecretBridge,
    admin: Credential,
    client_id: String,
    token_duration: String,
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenBroker {
    /// Creates a broker.
    pub fn new(
        config: &BridgeConfig,
        transport: HttpTransport,
        endpoints: EndpointResolver,
        secrets: SecretBridge,
        admin: Credential,
    ) -> Self {
        Self {
            transport,
            endpoints,
            secrets,
            admin,
            client_id: config.client_id.clone(),
            token_duration: config.token_duration.clone(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the administrative username.
    #[must_use]
    pub fn admin_username(&self) -> &str {
        self.admin.username()
    }

    /// Returns the secret bridge used for the admin token.
    #[must_use]
    pub fn secrets(&self) -> &SecretBridge {
        &self.secrets
    }

    /// Returns a broker using `admin` as the administrative credential.
    #[must_use]
    pub fn with_admin_credential(&self, admin: Credential) -> Self {
        Self {
            admin,
            ..self.clone()
        }
    }

    /// Returns a broker whose admin password is read from the admin
    /// credential secret.
    pub async fn with_admin_password_from_secret(&self) -> IdpResult<Self> {
        let password = self
            .secrets
            .admin_password()
            .await
            .map_err(|e| IdpError::storage(&e))?;
        Ok(self.with_admin_credential(Credential::new(self.admin.username(), password)))
    }

    /// Exchanges a username and password for a bearer token using the
    /// resource-owner-password grant.
    pub async fn exchange_token(&self, username: &str, password: &str) -> IdpResult<Token> {
        let endpoint = self.endpoints.public().await?;
        let url = format!("{endpoint}/protocol/openid-connect/token");

        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("username", username)
            .append_pair("password", password)
            .append_pair("grant_type", "password")
            .append_pair("token-duration", &self.token_duration)
            .finish();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let body = self
            .transport
            .request(Method::POST, &url, headers, Some(form.into_bytes()))
            .await
            .map_err(|e| IdpError::Auth(format!("token request for {username} failed: {e}")))?;

        let response: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            IdpError::Auth(format!("undecodable token response for {username}: {e}"))
        })?;
        if response.access_token.is_empty() {
            return Err(IdpError::Auth(format!("empty access token for {username}")));
        }

        tracing::debug!(username, len = response.access_token.len(), "Token issued");
        Ok(Token::new(response.access_token))
    }

    /// Exchanges the administrative credential for a token.
    pub async fn admin_token(&self) -> IdpResult<Token> {
        self.exchange_token(self.admin.username(), self.admin.password())
            .await
    }

    /// Obtains a fresh admin token, persists it in the admin token secret and
    /// returns the value read back from the secret.
    ///
    /// Fails with [`IdpError::Storage`] if the write or the read-back fails,
    /// or if the read-back value is empty.
    pub async fn refreshed_admin_token(&self) -> IdpResult<Token> {
        let _guard = self.refresh_lock.lock().await;

        let token = self.admin_token().await?;
        self.secrets
            .store_org_token(token.as_str())
            .await
            .map_err(|e| IdpError::storage(&e))?;

        let stored = self
            .secrets
            .org_token()
            .await
            .map_err(|e| IdpError::storage(&e))?
            .ok_or_else(|| {
                IdpError::Storage(format!(
                    "admin token in secret {} is empty after refresh",
                    self.secrets.token_secret()
                ))
            })?;

        tracing::info!(secret = %self.secrets.token_secret(), "Admin token refreshed");
        Ok(Token::new(stored))
    }

    /// Wraps a token into outgoing request metadata.
    #[must_use]
    pub fn context_with_token(token: &Token) -> OutgoingContext {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            AUTH_HEADER.to_string(),
            format!("{AUTH_TOKEN_TYPE} {}", token.as_str()),
        );
        OutgoingContext { metadata }
    }

    /// Returns request metadata carrying a fresh admin token.
    pub async fn admin_context(&self) -> IdpResult<OutgoingContext> {
        let token = self.admin_token().await?;
        Ok(Self::context_with_token(&token))
    }

    /// Returns request metadata carrying the refreshed, persisted admin token.
    pub async fn admin_context_from_secret(&self) -> IdpResult<OutgoingContext> {
        let token = self.refreshed_admin_token().await?;
        Ok(Self::context_with_token(&token))
    }
}
