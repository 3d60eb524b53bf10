//! IdP endpoint discovery.
//!
//! The IdP exposes two base URLs per realm:
//!
//! - public: `{host}/auth/realms/{realm}` (token endpoint)
//! - admin: `{host}/auth/admin/realms/{realm}` (directory endpoints)
//!
//! They are derived either from an explicit override (needed when running
//! outside the cluster network) or from the issuer URL stored in the OIDC
//! connection secret. The stored issuer names a bare service, so its host is
//! expanded into a cluster-local DNS name in the secret's namespace.

use std::sync::Arc;

use kc_core::{BridgeConfig, SecretRef};
use kc_secrets::{read_field, SecretStore};

use crate::error::{IdpError, IdpResult};

/// Which of the two realm base URLs to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `/auth/admin/realms/{realm}`, for directory management.
    Admin,
    /// `/auth/realms/{realm}`, for token issuance.
    Public,
}

impl EndpointKind {
    /// Returns `true` for the admin endpoint.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Computes the IdP's realm base URLs.
#[derive(Clone)]
pub struct EndpointResolver {
    ui_endpoint: Option<String>,
    store: Arc<dyn SecretStore>,
    oidc_secret: SecretRef,
    issuer_field: String,
    realm: String,
}

impl EndpointResolver {
    /// Creates a resolver from configuration.
    pub fn new(config: &BridgeConfig, store: Arc<dyn SecretStore>) -> Self {
        Self {
            ui_endpoint: config.ui_endpoint.clone(),
            store,
            oidc_secret: config.oidc_secret(),
            issuer_field: config.issuer_field.clone(),
            realm: config.realm.clone(),
        }
    }

    /// Resolves the base URL of `kind`.
    ///
    /// Fails with [`IdpError::Config`] for a malformed override and with
    /// [`IdpError::Lookup`] when the OIDC secret, its issuer field, or a
    /// usable issuer URL is missing.
    pub async fn resolve(&self, kind: EndpointKind) -> IdpResult<String> {
        if let Some(endpoint) = self.ui_endpoint.as_deref() {
            return from_override(endpoint, &self.realm, kind);
        }

        let secret = self
            .store
            .get_secret(&self.oidc_secret)
            .await
            .map_err(|e| IdpError::lookup(&e))?;
        let issuer = read_field(&secret, &self.issuer_field)
            .map_err(|e| IdpError::lookup(&e))?
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                IdpError::Lookup(format!(
                    "secret {} has no {} field",
                    self.oidc_secret, self.issuer_field
                ))
            })?;

        let url = expand_service_host(issuer.trim(), &self.oidc_secret.namespace)?;
        let url = match kind {
            EndpointKind::Public => url,
            EndpointKind::Admin => splice_admin(&url)?,
        };
        tracing::debug!(endpoint = %url, admin = kind.is_admin(), "Resolved IdP endpoint from secret");
        Ok(url)
    }

    /// Resolves the admin base URL.
    pub async fn admin(&self) -> IdpResult<String> {
        self.resolve(EndpointKind::Admin).await
    }

    /// Resolves the public base URL.
    pub async fn public(&self) -> IdpResult<String> {
        self.resolve(EndpointKind::Public).await
    }
}

fn from_override(endpoint: &str, realm: &str, kind: EndpointKind) -> IdpResult<String> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let parsed = url::Url::parse(endpoint)
        .map_err(|e| IdpError::Config(format!("invalid IdP endpoint override {endpoint:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(IdpError::Config(format!(
            "IdP endpoint override {endpoint:?} must be an http(s) URL with a host"
        )));
    }

    Ok(match kind {
        EndpointKind::Admin => format!("{endpoint}/auth/admin/realms/{realm}"),
        EndpointKind::Public => format!("{endpoint}/auth/realms/{realm}"),
    })
}

/// Appends `.{namespace}.svc.cluster.local` to the host of `issuer`, keeping
/// scheme, port and path byte-for-byte.
fn expand_service_host(issuer: &str, namespace: &str) -> IdpResult<String> {
    let (scheme, rest) = issuer
        .split_once("://")
        .ok_or_else(|| IdpError::Lookup(format!("issuer {issuer:?} is not an absolute URL")))?;
    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_end);
    if host.is_empty() {
        return Err(IdpError::Lookup(format!("issuer {issuer:?} has no host")));
    }
    Ok(format!("{scheme}://{host}.{namespace}.svc.cluster.local{tail}"))
}

/// Inserts `admin` after the `auth` path segment.
fn splice_admin(url: &str) -> IdpResult<String> {
    let authority_start = url.find("://").map_or(0, |i| i + 3);
    let path_start = url[authority_start..]
        .find('/')
        .map(|i| authority_start + i)
        .ok_or_else(|| IdpError::Lookup(format!("issuer {url:?} has no path")))?;

    let path = &url[path_start..];
    let segment = path
        .match_indices("/auth")
        .find(|(i, _)| matches!(path.as_bytes().get(i + 5), None | Some(b'/')))
        .map(|(i, _)| path_start + i + 5)
        .ok_or_else(|| IdpError::Lookup(format!("issuer {url:?} has no auth path segment")))?;

    Ok(format!("{}/admin{}", &url[..segment], &url[segment..]))
}
