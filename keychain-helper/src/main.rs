//! Keychain Helper demo
//!
//! Runs the sample flow against the OS keychain:
//! - make sure a vendor id is stored, then print it
//! - save a username/password pair, read it back and print it
//!
//! Configuration comes from `KeychainConfig::load`; set
//! `KEYCHAIN_HELPER_LOG_FORMAT=json` for JSON log lines.

use anyhow::{Context, Result};
use keychain_helper::{GeneratedVendorId, KeychainConfig, KeyringStore, UserKeychain};

/// Initialize structured logging with tracing
fn init_logging() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("KEYCHAIN_HELPER_LOG_FORMAT").is_ok_and(|v| v == "json");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> Result<()> {
    init_logging();

    let config = KeychainConfig::load(None).context("failed to load configuration")?;
    tracing::info!(service = %config.service, "Keychain Helper starting");

    let keychain = UserKeychain::with_config(
        KeyringStore::new(&config.service),
        GeneratedVendorId,
        &config,
    );

    // Vendor id
    keychain.ensure_vendor_id();
    let vendor_id = keychain.vendor_id().unwrap_or_default();
    println!("IDFV: {vendor_id}");

    // Username and password
    if !keychain.save_credential("username", "password") {
        tracing::error!("Failed to save credentials");
    }
    match keychain.credential() {
        Some(credentials) => println!(
            "username: {}, password: {}",
            credentials.account(),
            credentials.secret()
        ),
        None => tracing::warn!("No credentials stored"),
    }

    Ok(())
}
