//! Error types for keychain operations.

use thiserror::Error;

/// Errors surfaced by the secret store and the keychain facade.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Nothing is stored under the label. Reads treat this as absent,
    /// deletes as success.
    #[error("no entry found for label '{0}'")]
    NotFound(String),

    #[error("an entry for label '{0}' already exists")]
    Duplicate(String),

    #[error("store failure: {0}")]
    Store(String),

    #[error("malformed entry for label '{label}': {reason}")]
    Malformed { label: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl KeychainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<keyring::Error> for KeychainError {
    fn from(e: keyring::Error) -> Self {
        Self::Store(e.to_string())
    }
}

/// Convenience result alias for keychain operations.
pub type Result<T> = std::result::Result<T, KeychainError>;
