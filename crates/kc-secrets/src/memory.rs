//! In-process secret store.

use std::collections::HashMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kc_core::SecretRef;
use parking_lot::RwLock;

use crate::error::{SecretError, SecretResult};
use crate::store::{secret_ref_of, write_field, SecretStore};

/// Secret store holding secrets in process memory.
///
/// Like the API server, updates replace whole objects and fail for secrets
/// that were never inserted.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<SecretRef, Secret>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a secret.
    pub fn insert(&self, secret: Secret) -> SecretResult<()> {
        let key = secret_ref_of(&secret)?;
        self.secrets.write().insert(key, secret);
        Ok(())
    }

    /// Inserts a secret built from text fields.
    pub fn insert_fields(&self, secret: &SecretRef, fields: &[(&str, &str)]) {
        let mut object = Secret {
            metadata: ObjectMeta {
                name: Some(secret.name.clone()),
                namespace: Some(secret.namespace.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        for (field, value) in fields {
            write_field(&mut object, field, value);
        }
        self.secrets.write().insert(secret.clone(), object);
    }

    /// Returns a copy of a stored secret.
    #[must_use]
    pub fn snapshot(&self, secret: &SecretRef) -> Option<Secret> {
        self.secrets.read().get(secret).cloned()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, secret: &SecretRef) -> SecretResult<Secret> {
        self.secrets
            .read()
            .get(secret)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(secret.clone()))
    }

    async fn update_secret(&self, secret: &Secret) -> SecretResult<Secret> {
        let key = secret_ref_of(secret)?;
        let mut secrets = self.secrets.write();
        match secrets.get_mut(&key) {
            Some(existing) => {
                *existing = secret.clone();
                Ok(secret.clone())
            }
            None => Err(SecretError::NotFound(key)),
        }
    }
}
