//! Store registry
//!
//! Maps human-readable names to [`Store`] handles so a running process can
//! expose its key-value stores for browsing. Registration may happen at any
//! point in the process lifetime, concurrently with lookups.

use kvweb_storage::Store;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a registered store.
pub type StoreHandle = Arc<dyn Store>;

/// Store registry
///
/// Entries are never removed. The registry only holds a shared handle; the
/// registering caller remains responsible for the underlying engine.
#[derive(Default)]
pub struct StoreRegistry {
    /// Store name → handle
    stores: RwLock<HashMap<String, StoreHandle>>,
}

impl StoreRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, store: StoreHandle) {
        let name = name.into();
        let replaced = self.stores.write().insert(name.clone(), store).is_some();
        debug!(store = %name, replaced, "registered store");
    }

    /// Register an owned store value.
    pub fn register_store<S: Store + 'static>(&self, name: impl Into<String>, store: S) {
        self.register(name, Arc::new(store));
    }

    /// Resolve name → handle
    pub fn lookup(&self, name: &str) -> Option<StoreHandle> {
        self.stores.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stores.read().contains_key(name)
    }

    /// Snapshot of the registered names, in no particular order.
    pub fn list_names(&self) -> Vec<String> {
        self.stores.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("stores", &self.list_names())
            .finish()
    }
}
