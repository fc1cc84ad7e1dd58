use anyhow::Context;
use std::sync::Arc;
use token_issuer::config::IssuerConfig;
use token_issuer::keys::KeyManager;
use token_issuer::observability::init_tracing;
use token_issuer::services::jwks_publisher::JwksPublisher;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    init_tracing("token_issuer=info,issuer=info");

    info!(target: "issuer", "Starting token issuer key check");

    let config = IssuerConfig::from_env().map_err(|e| {
        error!(target: "issuer", error = %e, "Failed to load configuration");
        e
    })?;

    // A key that fails to load must stop startup
    let keys = KeyManager::load(&config.key).map_err(|e| {
        error!(target: "issuer.keys", error = %e, "Refusing to start without a usable signing key");
        e
    })?;

    info!(
        target: "issuer",
        kid = %keys.key_id(),
        issuer = %config.issuer,
        access_token_ttl_minutes = config.access_token_ttl_minutes,
        refresh_token_ttl_days = config.refresh_token_ttl_days,
        "Signing key ready"
    );

    let publisher = JwksPublisher::new(Arc::new(keys));
    let jwks = publisher
        .to_json()
        .context("Failed to render JWKS document")?;

    println!("{jwks}");
    Ok(())
}
