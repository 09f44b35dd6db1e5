//! # kvweb storage
//!
//! The narrow read capability the browser needs from a key-value engine:
//! ordered key iteration, existence checks and point lookups.
//!
//! Two backends ship with the crate:
//! - [`SledStore`]: a view over a caller-owned `sled` tree
//! - [`MemoryStore`]: an ordered in-memory map, handy for tests and
//!   processes that keep their state in RAM

use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Lazy, fallible key iterator returned by [`Store::keys`].
pub type KeyIter<'a> = Box<dyn Iterator<Item = Result<Vec<u8>>> + Send + 'a>;

/// Abstract read-only store.
///
/// Implementations are shared between a registry and any number of
/// concurrent requests, so every method takes `&self`.
pub trait Store: Send + Sync {
    /// Every key in store order, starting from the empty prefix.
    ///
    /// An `Err` item reports an iteration failure; callers stop there.
    fn keys(&self) -> KeyIter<'_>;

    fn contains_key(&self, key: &[u8]) -> Result<bool>;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Sled-backed implementation.
///
/// Holds a clone of the owner's tree handle. The owner keeps the `sled::Db`
/// and stays responsible for flushing and closing it.
#[derive(Clone)]
pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    pub fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }

    /// View over the default tree of `db`.
    pub fn from_db(db: &sled::Db) -> Self {
        Self {
            tree: (**db).clone(),
        }
    }
}

impl From<sled::Tree> for SledStore {
    fn from(tree: sled::Tree) -> Self {
        Self::new(tree)
    }
}

impl Store for SledStore {
    fn keys(&self) -> KeyIter<'_> {
        Box::new(
            self.tree
                .scan_prefix(b"")
                .keys()
                .map(|r| r.map(|k| k.to_vec()).map_err(StoreError::from)),
        )
    }

    fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.tree.contains_key(key)?)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }
}

/// In-memory backend ordered by raw key bytes.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner-side write; the browsing path never calls this.
    pub fn insert(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.entries.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl Store for MemoryStore {
    // Snapshot under the read lock so the guard is not held while the
    // caller walks the keys.
    fn keys(&self) -> KeyIter<'_> {
        let keys: Vec<Vec<u8>> = self.entries.read().keys().cloned().collect();
        Box::new(keys.into_iter().map(Ok))
    }

    fn contains_key(&self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }
}
