//! Secret store trait and field helpers.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kc_core::SecretRef;

use crate::error::{SecretError, SecretResult};

#[cfg(test)]
use mockall::automock;

/// Access to namespaced secret objects.
///
/// Only the two operations the bridge needs are exposed: fetch a secret by
/// name and namespace, and replace a previously fetched secret.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches a secret.
    ///
    /// Returns [`SecretError::NotFound`] if it does not exist.
    async fn get_secret(&self, secret: &SecretRef) -> SecretResult<Secret>;

    /// Replaces an existing secret, addressed by its metadata.
    ///
    /// Returns the stored object.
    async fn update_secret(&self, secret: &Secret) -> SecretResult<Secret>;
}

/// Returns the namespace and name a secret object is addressed by.
pub fn secret_ref_of(secret: &Secret) -> SecretResult<SecretRef> {
    let name = secret
        .metadata
        .name
        .clone()
        .ok_or_else(|| SecretError::InvalidObject("secret has no name".to_string()))?;
    let namespace = secret
        .metadata
        .namespace
        .clone()
        .ok_or_else(|| SecretError::InvalidObject(format!("secret {name} has no namespace")))?;
    Ok(SecretRef::new(namespace, name))
}

/// Reads a data field as UTF-8 text.
///
/// Returns `None` if the field is absent and [`SecretError::InvalidObject`]
/// if it is not valid UTF-8.
pub fn read_field(secret: &Secret, field: &str) -> SecretResult<Option<String>> {
    let Some(value) = secret.data.as_ref().and_then(|data| data.get(field)) else {
        return Ok(None);
    };
    String::from_utf8(value.0.clone()).map(Some).map_err(|_| {
        let name = secret.metadata.name.as_deref().unwrap_or_default();
        SecretError::InvalidObject(format!("field {field} of secret {name} is not valid UTF-8"))
    })
}

/// Sets a data field, creating the data map if needed.
pub fn write_field(secret: &mut Secret, field: &str, value: &str) {
    secret
        .data
        .get_or_insert_with(Default::default)
        .insert(field.to_string(), ByteString(value.as_bytes().to_vec()));
}
