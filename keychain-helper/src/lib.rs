//! Keychain Helper - vendor id and credential storage in the OS keychain
//!
//! Persists two kinds of secrets into a platform credential store:
//! - a vendor identifier string, written once per install
//! - a single username/password pair, inserted or updated in place
//!
//! The store itself is reached through the [`SecretStore`] seam:
//! - [`KeyringStore`]: macOS Keychain, Secret Service, Windows Credential Manager
//! - [`MemoryStore`]: in-process, for tests and ephemeral use
//!
//! Construct one [`UserKeychain`] per process and pass it to callers.

pub mod config;
pub mod error;
pub mod identity;
pub mod keychain;
pub mod store;

// Re-export commonly used types
pub use config::KeychainConfig;
pub use error::{KeychainError, Result};
pub use identity::{GeneratedVendorId, StaticVendorId, VendorIdProvider};
pub use keychain::{Credentials, SaveOutcome, UserKeychain, VendorIdOutcome};
pub use store::{Item, KeyringStore, MemoryStore, QueryOptions, SecretStore};
