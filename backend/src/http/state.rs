//! Application state for the HTTP server.

use std::sync::Arc;

use crate::data::DatasetStore;
use crate::services::SessionStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded artifact and its derived metadata
    pub store: Arc<DatasetStore>,
    /// View sessions and their play loops
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new application state around a dataset store.
    pub fn new(store: Arc<DatasetStore>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
        }
    }
}
