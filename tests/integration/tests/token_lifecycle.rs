//! Token exchange and admin token refresh tests.

use kc_admin_client::{TokenBroker, AUTH_HEADER};
use kc_core::SecretRef;

use crate::common::{TestEnv, ADMIN_PASSWORD, ADMIN_USERNAME, CA_FIELD};

const TOKEN_FIELD: &str = "PX_BACKUP_ORG_TOKEN";

#[tokio::test]
async fn test_exchange_token() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let token = env
        .bridge
        .tokens()
        .exchange_token(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await?;

    assert!(token.as_str().starts_with("tok-px-central-admin-"));
    // Ephemeral tokens are never persisted.
    assert_eq!(env.token_secret_field(TOKEN_FIELD), None);

    Ok(())
}

#[tokio::test]
async fn test_exchange_with_wrong_password_is_auth_error() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let err = env
        .bridge
        .tokens()
        .exchange_token(ADMIN_USERNAME, "not-the-password")
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(err.to_string().contains("401"));
    Ok(())
}

#[tokio::test]
async fn test_refreshed_admin_token_is_persisted() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let token = env.bridge.tokens().refreshed_admin_token().await?;

    assert_eq!(env.token_secret_field(TOKEN_FIELD).as_deref(), Some(token.as_str()));
    assert_eq!(
        env.token_secret_field(CA_FIELD).as_deref(),
        Some("-----BEGIN CERTIFICATE-----")
    );
    assert_eq!(env.bridge.secrets().org_token().await?.as_deref(), Some(token.as_str()));

    // Every refresh issues a new token and overwrites the cached one.
    let next = env.bridge.tokens().refreshed_admin_token().await?;
    assert_ne!(next, token);
    assert_eq!(env.token_secret_field(TOKEN_FIELD).as_deref(), Some(next.as_str()));

    Ok(())
}

#[tokio::test]
async fn test_admin_contexts_carry_bearer_metadata() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let tokens = env.bridge.tokens();

    let ctx = tokens.admin_context().await?;
    let value = ctx.get(AUTH_HEADER).unwrap_or_default();
    assert!(value.starts_with("bearer tok-"));

    let ctx = tokens.admin_context_from_secret().await?;
    let stored = env.token_secret_field(TOKEN_FIELD).unwrap_or_default();
    assert_eq!(ctx.authorization(), Some(format!("bearer {stored}").as_str()));

    // Wrapping is pure.
    let token = tokens.refreshed_admin_token().await?;
    assert_eq!(
        TokenBroker::context_with_token(&token),
        TokenBroker::context_with_token(&token)
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_token_secret_is_storage_error() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let mut config = env.config.clone();
    config.admin_token_secret = SecretRef::new("px-backup", "absent-secret");

    let bridge = kc_admin_client::IdentityBridge::new(config, env.store.clone(), ADMIN_PASSWORD)?;
    let err = bridge.tokens().refreshed_admin_token().await.unwrap_err();

    assert!(err.is_storage_error());
    Ok(())
}

#[tokio::test]
async fn test_admin_password_reloaded_from_secret() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let stale = env.bridge_with_password("outdated")?;
    assert!(stale.tokens().admin_token().await.unwrap_err().is_auth_error());

    // Reloading returns a new bridge and leaves the stale one untouched.
    let reloaded = stale.with_admin_password_from_secret().await?;
    reloaded.tokens().admin_token().await?;
    reloaded.directory().list_roles().await?;
    assert!(stale.tokens().admin_token().await.is_err());

    // A password rotated in the IdP and the secret is picked up on reload.
    env.idp.set_password(ADMIN_USERNAME, "rotated");
    env.store
        .insert_fields(&env.config.admin_credential_secret, &[("credential", "rotated")]);
    assert!(reloaded.tokens().admin_token().await.is_err());
    let rotated = reloaded.with_admin_password_from_secret().await?;
    rotated.tokens().admin_token().await?;

    Ok(())
}

#[tokio::test]
async fn test_refreshes_through_one_broker_are_serialized() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let a = env.bridge.tokens().clone();
    let b = env.bridge.tokens().clone();

    let (ta, tb) = tokio::join!(a.refreshed_admin_token(), b.refreshed_admin_token());
    let (ta, tb) = (ta?, tb?);

    // Each refresh read back its own write.
    assert_ne!(ta, tb);
    let stored = env.token_secret_field(TOKEN_FIELD).unwrap_or_default();
    assert!(stored == ta.as_str() || stored == tb.as_str());

    Ok(())
}

#[tokio::test]
async fn test_independent_brokers_overwrite_each_other() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    // Two bridges model two processes sharing the secret but not a lock.
    let first = env.bridge_with_password(ADMIN_PASSWORD)?;
    let second = env.bridge_with_password(ADMIN_PASSWORD)?;

    let token_first = first.tokens().refreshed_admin_token().await?;
    let token_second = second.tokens().refreshed_admin_token().await?;

    // Known limitation: the secret update has no compare-and-swap, so the
    // first caller now holds a token that is no longer the cached one.
    let stored = env.token_secret_field(TOKEN_FIELD).unwrap_or_default();
    assert_eq!(stored, token_second.as_str());
    assert_ne!(stored, token_first.as_str());
    assert_eq!(env.idp.issued_tokens(), 2);

    Ok(())
}
