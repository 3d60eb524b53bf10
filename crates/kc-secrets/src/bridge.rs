//! Access to the admin credential secret and the admin token secret.

use std::sync::Arc;

use kc_core::{BridgeConfig, SecretRef};

use crate::error::{SecretError, SecretResult};
use crate::store::{read_field, write_field, SecretStore};

/// Reads and writes the two durable secrets of the administrative identity.
#[derive(Clone)]
pub struct SecretBridge {
    store: Arc<dyn SecretStore>,
    credential_secret: SecretRef,
    password_field: String,
    token_secret: SecretRef,
    token_field: String,
}

impl SecretBridge {
    /// Creates a bridge over `store` using the secret locations in `config`.
    pub fn new(store: Arc<dyn SecretStore>, config: &BridgeConfig) -> Self {
        Self {
            store,
            credential_secret: config.admin_credential_secret.clone(),
            password_field: config.admin_password_field.clone(),
            token_secret: config.admin_token_secret.clone(),
            token_field: config.admin_token_field.clone(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Returns the admin token secret location.
    #[must_use]
    pub fn token_secret(&self) -> &SecretRef {
        &self.token_secret
    }

    /// Reads a text field, failing if it is absent.
    pub async fn read_field(&self, secret: &SecretRef, field: &str) -> SecretResult<String> {
        let object = self.store.get_secret(secret).await?;
        read_field(&object, field)?.ok_or_else(|| SecretError::MissingField {
            secret: secret.clone(),
            field: field.to_string(),
        })
    }

    /// Reads the administrative password.
    ///
    /// An absent or empty field is an error.
    pub async fn admin_password(&self) -> SecretResult<String> {
        let password = match self
            .read_field(&self.credential_secret, &self.password_field)
            .await
        {
            Ok(p) => p,
            Err(SecretError::MissingField { secret, field }) => {
                return Err(SecretError::EmptyField { secret, field });
            }
            Err(e) => return Err(e),
        };
        if password.is_empty() {
            return Err(SecretError::EmptyField {
                secret: self.credential_secret.clone(),
                field: self.password_field.clone(),
            });
        }
        Ok(password)
    }

    /// Writes `token` into the cached-token field of the admin token secret.
    ///
    /// Other fields of the secret are preserved. The update is not
    /// conditional on the version that was read.
    pub async fn store_org_token(&self, token: &str) -> SecretResult<()> {
        let mut secret = self.store.get_secret(&self.token_secret).await?;
        write_field(&mut secret, &self.token_field, token);
        self.store.update_secret(&secret).await?;
        tracing::debug!(secret = %self.token_secret, len = token.len(), "Cached admin token written");
        Ok(())
    }

    /// Reads the cached organization token.
    ///
    /// Returns `None` if the field is absent or empty.
    pub async fn org_token(&self) -> SecretResult<Option<String>> {
        let secret = self.store.get_secret(&self.token_secret).await?;
        Ok(read_field(&secret, &self.token_field)?.filter(|t| !t.is_empty()))
    }
}
