//! # kvweb browser
//!
//! Serves a navigable HTTP view over the stores in a [`StoreRegistry`]:
//!
//! - `GET <mount>` and `GET <mount>/`: one link per registered store
//! - `GET <mount>/<store>`: one link per key, in store order
//! - `GET <mount>/<store>/<key>`: the raw value bytes
//!
//! Every failure (unknown store, missing key, store error, malformed path)
//! answers `404 Not Found`.
//!
//! [`StoreRegistry`]: kvweb_registry::StoreRegistry

pub mod browse;
pub mod error;
pub mod path;
pub mod render;
pub mod server;

pub use browse::{Browsed, Browser};
pub use error::BrowseError;
pub use path::{normalize_mount, BrowsePath};
pub use server::{
    bind_listener, build_router, serve, spawn_server, start_server_with_shutdown, AppState,
};
