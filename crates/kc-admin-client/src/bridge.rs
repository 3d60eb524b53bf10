//! Wiring of the bridge components from one configuration.

use std::sync::Arc;

use kc_core::BridgeConfig;
use kc_secrets::{SecretBridge, SecretStore};

use crate::client::IdentityClient;
use crate::directory::DirectoryOperations;
use crate::endpoint::EndpointResolver;
use crate::error::{IdpError, IdpResult};
use crate::http::HttpTransport;
use crate::token::{Credential, TokenBroker};

/// The assembled identity bridge.
///
/// All components share one HTTP connection pool and one secret store.
#[derive(Clone)]
pub struct IdentityBridge {
    config: BridgeConfig,
    transport: HttpTransport,
    endpoints: EndpointResolver,
    broker: TokenBroker,
    directory: DirectoryOperations,
}

impl IdentityBridge {
    /// Builds the bridge with an explicit administrative password.
    pub fn new(
        config: BridgeConfig,
        store: Arc<dyn SecretStore>,
        admin_password: impl Into<String>,
    ) -> IdpResult<Self> {
        config
            .validate()
            .map_err(|e| IdpError::Config(e.to_string()))?;

        let transport = HttpTransport::new(config.http_timeout())?;
        let endpoints = EndpointResolver::new(&config, Arc::clone(&store));
        let secrets = SecretBridge::new(store, &config);
        let broker = TokenBroker::new(
            &config,
            transport.clone(),
            endpoints.clone(),
            secrets,
            Credential::new(&config.admin_username, admin_password),
        );
        let directory = Self::directory_for(&config, &transport, &endpoints, &broker);

        tracing::debug!(
            namespace = %config.namespace,
            override_endpoint = config.ui_endpoint.is_some(),
            "Identity bridge assembled"
        );

        Ok(Self {
            config,
            transport,
            endpoints,
            broker,
            directory,
        })
    }

    /// Builds the bridge, reading the administrative password from the admin
    /// credential secret.
    pub async fn from_secret(config: BridgeConfig, store: Arc<dyn SecretStore>) -> IdpResult<Self> {
        Self::new(config, store, String::new())?
            .with_admin_password_from_secret()
            .await
    }

    fn directory_for(
        config: &BridgeConfig,
        transport: &HttpTransport,
        endpoints: &EndpointResolver,
        broker: &TokenBroker,
    ) -> DirectoryOperations {
        let client = IdentityClient::new(transport.clone(), broker.clone(), endpoints.clone());
        DirectoryOperations::new(client, config.consistency, &config.realm)
    }

    /// Returns a bridge whose broker reads the admin password from the admin
    /// credential secret. `self` is left unchanged.
    pub async fn with_admin_password_from_secret(&self) -> IdpResult<Self> {
        let broker = self.broker.with_admin_password_from_secret().await?;
        let directory = Self::directory_for(&self.config, &self.transport, &self.endpoints, &broker);
        Ok(Self {
            broker,
            directory,
            ..self.clone()
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the endpoint resolver.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointResolver {
        &self.endpoints
    }

    /// Returns the secret bridge.
    #[must_use]
    pub fn secrets(&self) -> &SecretBridge {
        self.broker.secrets()
    }

    /// Returns the token broker.
    #[must_use]
    pub fn tokens(&self) -> &TokenBroker {
        &self.broker
    }

    /// Returns the directory operations.
    #[must_use]
    pub fn directory(&self) -> &DirectoryOperations {
        &self.directory
    }
}
