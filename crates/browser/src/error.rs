//! Error types for store browsing

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kvweb_storage::StoreError;
use thiserror::Error;
use tracing::{debug, warn};

/// Every variant surfaces to the client as `404 Not Found`.
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("Store not registered: {store}")]
    NotRegistered { store: String },

    #[error("Failed to iterate store {store}: {source}")]
    IterationFailure {
        store: String,
        #[source]
        source: StoreError,
    },

    #[error("Key not found in store {store}: {key}")]
    KeyAbsent { store: String, key: String },

    #[error("Failed to fetch key {key} from store {store}: {source}")]
    FetchFailure {
        store: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Malformed browse path: {path}")]
    MalformedPath { path: String },
}

pub type Result<T> = std::result::Result<T, BrowseError>;

impl BrowseError {
    pub fn status(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    /// Store faults are worth a warning; absences are routine.
    fn log(&self) {
        match self {
            BrowseError::IterationFailure { .. } | BrowseError::FetchFailure { .. } => {
                warn!("{}", self)
            }
            _ => debug!("{}", self),
        }
    }
}

impl IntoResponse for BrowseError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), "Not Found").into_response()
    }
}
