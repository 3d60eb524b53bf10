//! Kubernetes-backed secret store.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kc_core::SecretRef;
use kube::api::{Api, PostParams};
use kube::Client;

use crate::error::{SecretError, SecretResult};
use crate::store::{secret_ref_of, SecretStore};

/// Secret store backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Creates a store over an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a store from the ambient kubeconfig or in-cluster environment.
    pub async fn try_default() -> SecretResult<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get_secret(&self, secret: &SecretRef) -> SecretResult<Secret> {
        match self.api(&secret.namespace).get(&secret.name).await {
            Ok(s) => Ok(s),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Err(SecretError::NotFound(secret.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_secret(&self, secret: &Secret) -> SecretResult<Secret> {
        let target = secret_ref_of(secret)?;
        let stored = match self
            .api(&target.namespace)
            .replace(&target.name, &PostParams::default(), secret)
            .await
        {
            Ok(s) => s,
            Err(kube::Error::Api(ae)) if ae.code == 404 => return Err(SecretError::NotFound(target)),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(secret = %target, "Secret updated");
        Ok(stored)
    }
}
