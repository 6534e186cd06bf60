//! Vendor id and username/password records on top of a [`SecretStore`].
//!
//! Two records, each under its own label:
//! - vendor id: written once, never updated
//! - credentials: at most one entry, inserted or updated in place
//!
//! Every operation has a `try_` form that reports what happened and why it
//! failed, and a plain form that collapses the result to `bool`/`Option`
//! the way callers usually want it: not-found counts as absent for reads and
//! as success for deletes, anything else the store reports is a failure.
//!
//! The store is queried and then written in two separate calls. Two callers
//! racing on the same label can both see "absent" and both insert; the
//! store's duplicate check is the only guard.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::KeychainConfig;
use crate::error::{KeychainError, Result};
use crate::identity::VendorIdProvider;
use crate::store::{Item, QueryOptions, SecretStore};

/// A username/password pair. Both fields are wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    account: String,
    secret: String,
}

impl Credentials {
    pub fn new(account: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            secret: secret.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// What [`UserKeychain::try_save_credential`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing was stored; a new entry was added.
    Inserted,
    /// The stored pair already matched.
    Unchanged,
    /// The stored pair differed and was rewritten.
    Updated,
    /// The stored entry could not be decoded; everything under the label
    /// was removed and a new entry added.
    Replaced,
}

/// What [`UserKeychain::try_ensure_vendor_id`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorIdOutcome {
    AlreadyPresent,
    Stored(String),
    /// The provider had no identifier to offer; nothing was written.
    Unavailable,
}

fn malformed(label: &str, reason: &str) -> KeychainError {
    KeychainError::Malformed {
        label: label.to_string(),
        reason: reason.to_string(),
    }
}

fn decode_text(label: &str, data: Option<Vec<u8>>) -> Result<String> {
    let data = data.ok_or_else(|| malformed(label, "missing data"))?;
    String::from_utf8(data).map_err(|_| malformed(label, "data is not valid UTF-8"))
}

fn decode_credentials(label: &str, item: Item) -> Result<Credentials> {
    let account = item
        .account
        .ok_or_else(|| malformed(label, "missing account"))?;
    let secret = decode_text(label, item.data)?;
    Ok(Credentials { account, secret })
}

/// Facade over a secret store holding one vendor id and one credential.
///
/// Construct one per process (or per test) and hand it to whoever needs it.
pub struct UserKeychain<S, P> {
    store: S,
    vendor_ids: P,
    vendor_id_label: String,
    credential_label: String,
}

impl<S, P> UserKeychain<S, P>
where
    S: SecretStore,
    P: VendorIdProvider,
{
    /// Facade using the default labels.
    pub fn new(store: S, vendor_ids: P) -> Self {
        Self::with_config(store, vendor_ids, &KeychainConfig::default())
    }

    pub fn with_config(store: S, vendor_ids: P, config: &KeychainConfig) -> Self {
        Self {
            store,
            vendor_ids,
            vendor_id_label: config.vendor_id_label.clone(),
            credential_label: config.credential_label.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn vendor_id_label(&self) -> &str {
        &self.vendor_id_label
    }

    pub fn credential_label(&self) -> &str {
        &self.credential_label
    }

    /// `find` with not-found folded into `None`.
    fn lookup(&self, query: &QueryOptions) -> Result<Option<Item>> {
        match self.store.find(query) {
            Ok(found) => Ok(found),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete_label(&self, label: &str) -> Result<usize> {
        match self.store.delete(label) {
            Ok(removed) => Ok(removed),
            Err(e) if e.is_not_found() => Ok(0),
            Err(e) => Err(e),
        }
    }

    // -----------------------------------------------------------------------
    // Vendor id
    // -----------------------------------------------------------------------

    /// Store a vendor id if none is stored yet.
    ///
    /// Not atomic: a concurrent caller may insert between the lookup and the
    /// insert, in which case the insert fails with `Duplicate`.
    pub fn try_ensure_vendor_id(&self) -> Result<VendorIdOutcome> {
        let label = &self.vendor_id_label;
        if self.lookup(&QueryOptions::exists(label))?.is_some() {
            return Ok(VendorIdOutcome::AlreadyPresent);
        }
        let Some(id) = self.vendor_ids.current_vendor_id() else {
            tracing::debug!(label = %label, "vendor id provider has no value");
            return Ok(VendorIdOutcome::Unavailable);
        };
        self.store.insert(label, None, id.as_bytes())?;
        tracing::debug!(label = %label, "vendor id stored");
        Ok(VendorIdOutcome::Stored(id))
    }

    /// Store a vendor id if none is stored yet. Failures are logged and
    /// otherwise ignored.
    pub fn ensure_vendor_id(&self) {
        if let Err(e) = self.try_ensure_vendor_id() {
            tracing::warn!(label = %self.vendor_id_label, error = %e, "failed to ensure vendor id");
        }
    }

    pub fn try_vendor_id(&self) -> Result<Option<String>> {
        let label = &self.vendor_id_label;
        match self.lookup(&QueryOptions::full(label))? {
            Some(item) => decode_text(label, item.data).map(Some),
            None => Ok(None),
        }
    }

    /// The stored vendor id, or `None` if absent, unreadable or the store
    /// failed.
    pub fn vendor_id(&self) -> Option<String> {
        self.try_vendor_id().unwrap_or_else(|e| {
            tracing::warn!(label = %self.vendor_id_label, error = %e, "failed to read vendor id");
            None
        })
    }

    /// Remove every vendor id entry, returning how many were removed.
    pub fn try_delete_vendor_id(&self) -> Result<usize> {
        self.delete_label(&self.vendor_id_label)
    }

    /// `true` if the vendor id is gone afterwards, whether or not there was
    /// one to begin with.
    pub fn delete_vendor_id(&self) -> bool {
        self.try_delete_vendor_id()
            .inspect_err(|e| {
                tracing::warn!(
                    label = %self.vendor_id_label,
                    error = %e,
                    "failed to delete vendor id"
                );
            })
            .is_ok()
    }

    // -----------------------------------------------------------------------
    // Username and password
    // -----------------------------------------------------------------------

    /// Insert, update or leave alone the stored credential so that it equals
    /// `credentials`.
    ///
    /// Not atomic: the lookup and the write are separate store calls.
    pub fn try_save_credential(&self, credentials: &Credentials) -> Result<SaveOutcome> {
        let label = &self.credential_label;
        let account = Some(credentials.account());
        let secret = credentials.secret().as_bytes();

        let Some(item) = self.lookup(&QueryOptions::full(label))? else {
            self.store.insert(label, account, secret)?;
            tracing::debug!(label = %label, account = %credentials.account(), "credential added");
            return Ok(SaveOutcome::Inserted);
        };

        match decode_credentials(label, item) {
            Ok(current) if current == *credentials => Ok(SaveOutcome::Unchanged),
            Ok(_) => {
                self.store.update(label, account, secret)?;
                tracing::debug!(
                    label = %label,
                    account = %credentials.account(),
                    "credential updated"
                );
                Ok(SaveOutcome::Updated)
            }
            Err(e) => {
                tracing::warn!(label = %label, error = %e, "replacing unreadable credential entry");
                // A failed delete leaves the old entries in place. The insert
                // then collides only if one of them has the same account;
                // otherwise both end up under the label.
                if let Err(e) = self.delete_label(label) {
                    tracing::warn!(
                        label = %label,
                        error = %e,
                        "failed to clear credential entries"
                    );
                }
                self.store.insert(label, account, secret)?;
                Ok(SaveOutcome::Replaced)
            }
        }
    }

    /// Save `account`/`secret`. `true` if the store holds exactly that pair
    /// afterwards.
    pub fn save_credential(&self, account: &str, secret: &str) -> bool {
        self.try_save_credential(&Credentials::new(account, secret))
            .inspect_err(|e| {
                tracing::warn!(
                    label = %self.credential_label,
                    error = %e,
                    "failed to save credential"
                );
            })
            .is_ok()
    }

    pub fn try_credential(&self) -> Result<Option<Credentials>> {
        let label = &self.credential_label;
        match self.lookup(&QueryOptions::full(label))? {
            Some(item) => decode_credentials(label, item).map(Some),
            None => Ok(None),
        }
    }

    /// The stored credential, or `None` if absent, unreadable or the store
    /// failed.
    pub fn credential(&self) -> Option<Credentials> {
        self.try_credential().unwrap_or_else(|e| {
            tracing::warn!(label = %self.credential_label, error = %e, "failed to read credential");
            None
        })
    }

    /// Remove every credential entry, returning how many were removed.
    pub fn try_delete_all_credentials(&self) -> Result<usize> {
        self.delete_label(&self.credential_label)
    }

    /// `true` if no credential is stored afterwards.
    pub fn delete_all_credentials(&self) -> bool {
        self.try_delete_all_credentials()
            .inspect_err(|e| {
                tracing::warn!(
                    label = %self.credential_label,
                    error = %e,
                    "failed to delete credentials"
                );
            })
            .is_ok()
    }
}
