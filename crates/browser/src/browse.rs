//! Path resolution against the registry and the selected store.

use crate::error::{BrowseError, Result};
use crate::path::{normalize_mount, BrowsePath};
use crate::render;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use kvweb_registry::StoreRegistry;
use std::sync::Arc;

/// Successful browse outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Browsed {
    /// HTML fragment for the store or key directory.
    Listing(String),
    /// Raw value bytes.
    Value(Vec<u8>),
}

impl IntoResponse for Browsed {
    fn into_response(self) -> Response {
        match self {
            Browsed::Listing(html) => Html(html).into_response(),
            Browsed::Value(bytes) => {
                ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response()
            }
        }
    }
}

/// Resolves browse paths under a fixed mount prefix.
///
/// Never writes to the registry or to any store.
#[derive(Clone, Debug)]
pub struct Browser {
    registry: Arc<StoreRegistry>,
    mount: String,
}

impl Browser {
    pub fn new(registry: Arc<StoreRegistry>, mount: &str) -> Self {
        Self {
            registry,
            mount: normalize_mount(mount),
        }
    }

    /// Normalised mount prefix (empty for the root mount).
    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn registry(&self) -> &Arc<StoreRegistry> {
        &self.registry
    }

    /// Resolve a full request path to a listing or a value.
    pub fn respond(&self, path: &str) -> Result<Browsed> {
        match BrowsePath::parse(&self.mount, path) {
            BrowsePath::Stores => Ok(Browsed::Listing(self.list_stores())),
            BrowsePath::Keys(store) => self.list_keys(&store).map(Browsed::Listing),
            BrowsePath::Value(store, key) => self.fetch_value(&store, &key).map(Browsed::Value),
            BrowsePath::Malformed => Err(BrowseError::MalformedPath {
                path: path.to_string(),
            }),
        }
    }

    pub fn list_stores(&self) -> String {
        render::store_list(&self.mount, &self.registry.list_names())
    }

    /// Key directory of `store`, in store order.
    ///
    /// The page is only returned once iteration completes; an iteration
    /// error discards whatever was rendered so far.
    pub fn list_keys(&self, store: &str) -> Result<String> {
        let handle = self
            .registry
            .lookup(store)
            .ok_or_else(|| BrowseError::NotRegistered {
                store: store.to_string(),
            })?;

        render::key_list(&self.mount, store, handle.keys()).map_err(|source| {
            BrowseError::IterationFailure {
                store: store.to_string(),
                source,
            }
        })
    }

    /// Existence check followed by a fetch. The two calls are not atomic: a
    /// key removed by the store's owner in between reads as absent.
    pub fn fetch_value(&self, store: &str, key: &str) -> Result<Vec<u8>> {
        let handle = self
            .registry
            .lookup(store)
            .ok_or_else(|| BrowseError::NotRegistered {
                store: store.to_string(),
            })?;

        let fetch_failure = |source| BrowseError::FetchFailure {
            store: store.to_string(),
            key: key.to_string(),
            source,
        };
        let key_absent = || BrowseError::KeyAbsent {
            store: store.to_string(),
            key: key.to_string(),
        };

        if !handle.contains_key(key.as_bytes()).map_err(fetch_failure)? {
            return Err(key_absent());
        }
        handle
            .get(key.as_bytes())
            .map_err(fetch_failure)?
            .ok_or_else(key_absent)
    }
}
