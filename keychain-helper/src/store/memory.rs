//! In-process secret store.
//!
//! Mirrors the OS keychain's matching rules closely enough to exercise the
//! facade: several entries may share a label as long as their accounts
//! differ, deletes apply to every entry under a label, and an update that
//! would leave several identical entries is rejected.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{KeychainError, Result};
use crate::store::{Item, QueryOptions, SecretStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` as-is, bypassing duplicate checks. Lets callers plant
    /// entries the facade would never write itself.
    pub fn seed(&self, label: &str, item: Item) -> Result<()> {
        self.lock()?.entry(label.to_string()).or_default().push(item);
        Ok(())
    }

    /// Number of entries currently held under `label`.
    pub fn count(&self, label: &str) -> usize {
        self.lock()
            .map(|m| m.get(label).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Every entry under `label`, in insertion order.
    pub fn items(&self, label: &str) -> Vec<Item> {
        self.lock()
            .map(|m| m.get(label).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Item>>>> {
        self.entries
            .lock()
            .map_err(|_| KeychainError::Store("memory store lock poisoned".to_string()))
    }
}

impl SecretStore for MemoryStore {
    fn find(&self, query: &QueryOptions) -> Result<Option<Item>> {
        let entries = self.lock()?;
        Ok(entries
            .get(&query.label)
            .and_then(|items| items.first())
            .cloned()
            .map(|item| item.project(query)))
    }

    fn insert(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()> {
        let mut entries = self.lock()?;
        let items = entries.entry(label.to_string()).or_default();
        if items.iter().any(|i| i.account.as_deref() == account) {
            return Err(KeychainError::Duplicate(label.to_string()));
        }
        items.push(Item::new(account, data));
        Ok(())
    }

    fn update(&self, label: &str, account: Option<&str>, data: &[u8]) -> Result<()> {
        let mut entries = self.lock()?;
        match entries.get_mut(label) {
            // Rewriting several entries to one (account, data) would
            // duplicate them.
            Some(items) if items.len() > 1 => Err(KeychainError::Duplicate(label.to_string())),
            Some(items) if !items.is_empty() => {
                items[0] = Item::new(account, data);
                Ok(())
            }
            _ => Err(KeychainError::NotFound(label.to_string())),
        }
    }

    fn delete(&self, label: &str) -> Result<usize> {
        Ok(self.lock()?.remove(label).map_or(0, |items| items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_on_empty_store_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.find(&QueryOptions::full("IDFV")).unwrap(), None);
    }

    #[test]
    fn insert_rejects_same_account() {
        let store = MemoryStore::new();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        let err = store.insert("creds", Some("alice"), b"p2").unwrap_err();
        assert!(matches!(err, KeychainError::Duplicate(_)));
        assert_eq!(store.count("creds"), 1);
    }

    #[test]
    fn insert_allows_different_accounts_under_one_label() {
        let store = MemoryStore::new();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        store.insert("creds", Some("bob"), b"p2").unwrap();
        assert_eq!(store.count("creds"), 2);

        let first = store.find(&QueryOptions::full("creds")).unwrap().unwrap();
        assert_eq!(first.account.as_deref(), Some("alice"));
    }

    #[test]
    fn update_without_entry_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update("creds", Some("alice"), b"p1").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count("creds"), 0);
    }

    #[test]
    fn update_rewrites_single_entry() {
        let store = MemoryStore::new();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        store.update("creds", Some("carol"), b"p3").unwrap();

        assert_eq!(store.items("creds"), vec![Item::new(Some("carol"), b"p3")]);
    }

    #[test]
    fn update_over_several_entries_is_duplicate() {
        let store = MemoryStore::new();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        store.insert("creds", Some("bob"), b"p2").unwrap();

        let err = store.update("creds", Some("carol"), b"p3").unwrap_err();
        assert!(matches!(err, KeychainError::Duplicate(_)));
        assert_eq!(
            store.items("creds"),
            vec![Item::new(Some("alice"), b"p1"), Item::new(Some("bob"), b"p2")]
        );

        store.insert("creds", Some("carol"), b"p3").unwrap();
        assert_eq!(store.count("creds"), 3);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        store.insert("creds", Some("bob"), b"p2").unwrap();

        assert_eq!(store.delete("creds").unwrap(), 2);
        assert_eq!(store.delete("creds").unwrap(), 0);
        assert_eq!(store.find(&QueryOptions::exists("creds")).unwrap(), None);
    }

    #[test]
    fn labels_are_independent() {
        let store = MemoryStore::new();
        store.insert("IDFV", None, b"vendor").unwrap();
        store.insert("creds", Some("alice"), b"p1").unwrap();
        store.delete("creds").unwrap();
        assert_eq!(store.count("IDFV"), 1);
    }
}
