//! Secret store seam.
//!
//! The facade only ever talks to a [`SecretStore`]. Entries are scoped by a
//! label, carry an optional account attribute and an opaque data blob.
//! Atomicity of a single call is the store's job; nothing here coordinates
//! several calls.

pub mod keyring;
pub mod memory;

pub use self::keyring::KeyringStore;
pub use self::memory::MemoryStore;

use crate::error::Result;

/// What a lookup should match and return.
///
/// At most one entry is returned per lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub label: String,
    /// Populate [`Item::account`].
    pub return_attributes: bool,
    /// Populate [`Item::data`].
    pub return_data: bool,
}

impl QueryOptions {
    /// Existence check only: nothing but the match itself comes back.
    pub fn exists(label: &str) -> Self {
        Self {
            label: label.to_string(),
            return_attributes: false,
            return_data: false,
        }
    }

    /// Full lookup returning both the account attribute and the data.
    pub fn full(label: &str) -> Self {
        Self {
            label: label.to_string(),
            return_attributes: true,
            return_data: true,
        }
    }
}

/// A stored entry as returned by [`SecretStore::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub account: Option<String>,
    pub data: Option<Vec<u8>>,
}

impl Item {
    pub fn new(account: Option<&str>, data: &[u8]) -> Self {
        Self {
            account: account.map(str::to_string),
            data: Some(data.to_vec()),
        }
    }

    /// Strip whatever the query did not ask for.
    pub(crate) fn project(mut self, query: &QueryOptions) -> Self {
        if !query.return_attributes {
            self.account = None;
        }
        if !query.return_data {
            self.data = None;
        }
        self
    }
}

/// Trait for label-scoped secure secret storage.
pub trait SecretStore: Send + Sync {
    /// Look up the first entry under `query.label`.
    ///
    /// `Ok(None)` means nothing matched; `Err` is reserved for failures.
    fn find(&self, query: &QueryOptions) -> Result<Option<Item>>;

    /// Add a new entry. Fails with `Duplicate` if the label already holds an
    /// entry for the same account.
    fn insert(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()>;

    /// Rewrite the entry under `label`. Fails with `NotFound` if there is
    /// none and with `Duplicate` if several entries would end up identical.
    fn update(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()>;

    /// Remove every entry under `label`, returning how many were removed.
    /// Removing nothing is not an error.
    fn delete(&self, label: &str) -> Result<usize>;
}
