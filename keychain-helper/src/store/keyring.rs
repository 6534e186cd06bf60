//! OS keychain backend for the secret store.
//!
//! Uses the `keyring` crate to provide a cross-platform interface to:
//! - macOS: Keychain
//! - Linux: Secret Service (GNOME Keyring / KWallet)
//! - Windows: Credential Manager
//!
//! `keyring` addresses a credential by (service, user) and stores a single
//! secret, so each label becomes one entry under the configured service and
//! the account attribute travels inside the secret.

use base64::{Engine, engine::general_purpose::STANDARD};
use keyring::Entry;
use serde::{Deserialize, Serialize};

use crate::error::{KeychainError, Result};
use crate::store::{Item, QueryOptions, SecretStore};

/// Secret payload written to the keychain entry.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    account: Option<String>,
    /// Base64 of the raw data.
    data: String,
}

fn encode_envelope(account: Option<&str>, data: &[u8]) -> Result<Vec<u8>> {
    let envelope = Envelope {
        account: account.map(str::to_string),
        data: STANDARD.encode(data),
    };
    serde_json::to_vec(&envelope).map_err(|e| KeychainError::Store(e.to_string()))
}

/// Decode a stored secret. Anything that is not a valid envelope comes back
/// without an account or without data, which the facade treats as
/// malformed.
fn decode_envelope(raw: Vec<u8>) -> Item {
    match serde_json::from_slice::<Envelope>(&raw) {
        Ok(envelope) => match STANDARD.decode(&envelope.data) {
            Ok(data) => Item {
                account: envelope.account,
                data: Some(data),
            },
            Err(e) => {
                tracing::warn!(error = %e, "keychain entry has invalid base64 data");
                Item {
                    account: envelope.account,
                    data: None,
                }
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "keychain entry is not a valid envelope");
            Item {
                account: None,
                data: Some(raw),
            }
        }
    }
}

fn map_keyring_error(label: &str, e: keyring::Error) -> KeychainError {
    match e {
        keyring::Error::NoEntry => KeychainError::NotFound(label.to_string()),
        keyring::Error::Ambiguous(_) => {
            KeychainError::Store(format!("ambiguous keychain entry for label '{label}'"))
        }
        other => KeychainError::from(other),
    }
}

/// Storage backend using the OS keychain.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, label: &str) -> Result<Entry> {
        Entry::new(&self.service, label).map_err(|e| map_keyring_error(label, e))
    }

    /// Raw secret under `label`, `None` when the keychain has no entry.
    fn read(&self, entry: &Entry, label: &str) -> Result<Option<Vec<u8>>> {
        match entry.get_secret() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(label, e)),
        }
    }
}

impl SecretStore for KeyringStore {
    fn find(&self, query: &QueryOptions) -> Result<Option<Item>> {
        let entry = self.entry(&query.label)?;
        let found = self
            .read(&entry, &query.label)?
            .map(|raw| decode_envelope(raw).project(query));
        tracing::debug!(
            service = %self.service,
            label = %query.label,
            found = found.is_some(),
            "keychain lookup"
        );
        Ok(found)
    }

    fn insert(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()> {
        let entry = self.entry(label)?;
        // One keyring entry per label: any existing secret is a collision.
        if self.read(&entry, label)?.is_some() {
            return Err(KeychainError::Duplicate(label.to_string()));
        }
        entry
            .set_secret(&encode_envelope(account, data)?)
            .map_err(|e| map_keyring_error(label, e))?;
        tracing::debug!(service = %self.service, label, "keychain entry added");
        Ok(())
    }

    fn update(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()> {
        let entry = self.entry(label)?;
        if self.read(&entry, label)?.is_none() {
            return Err(KeychainError::NotFound(label.to_string()));
        }
        entry
            .set_secret(&encode_envelope(account, data)?)
            .map_err(|e| map_keyring_error(label, e))?;
        tracing::debug!(service = %self.service, label, "keychain entry updated");
        Ok(())
    }

    fn delete(&self, label: &str) -> Result<usize> {
        let entry = self.entry(label)?;
        // keyring 3.x uses delete_credential instead of delete_password
        match entry.delete_credential() {
            Ok(()) => Ok(1),
            Err(keyring::Error::NoEntry) => Ok(0),
            Err(e) => Err(map_keyring_error(label, e)),
        }
    }
}
