//! Artifact loading and the in-memory dataset store.
//!
//! The store is the explicit input-change notifier of the pipeline: derived
//! metadata lives with the loaded [`Dataset`] and is recomputed only when the
//! artifact is (re)loaded.

pub mod dataset;
pub mod error;
pub mod loader;

pub use dataset::{Dataset, DatasetOptions, DEFAULT_SERIES_WINDOW};
pub use error::{DatasetError, DatasetResult, ErrorContext};
pub use loader::{load_artifact, parse_artifact};

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lazily loaded, reloadable dataset shared by all requests.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    options: DatasetOptions,
    current: RwLock<Option<Arc<Dataset>>>,
}

impl DatasetStore {
    /// Store backed by the artifact at `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>, options: DatasetOptions) -> Self {
        Self {
            path: path.into(),
            options,
            current: RwLock::new(None),
        }
    }

    /// Store pre-populated with an already parsed dataset.
    pub fn from_dataset(path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        let options = dataset.options().clone();
        Self {
            path: path.into(),
            options,
            current: RwLock::new(Some(Arc::new(dataset))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// The current dataset, loading it on first use.
    ///
    /// A failed load is not cached: a missing artifact is reported on every
    /// call until the file appears.
    pub fn get(&self) -> DatasetResult<Arc<Dataset>> {
        if let Some(ds) = self.current.read().as_ref() {
            return Ok(Arc::clone(ds));
        }

        let mut slot = self.current.write();
        if let Some(ds) = slot.as_ref() {
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(load_artifact(&self.path, &self.options)?);
        *slot = Some(Arc::clone(&ds));
        Ok(ds)
    }

    /// Re-read the artifact and replace the current dataset.
    ///
    /// On failure the previously loaded dataset stays in place.
    pub fn reload(&self) -> DatasetResult<Arc<Dataset>> {
        let ds = load_artifact(&self.path, &self.options).map_err(|e| {
            log::warn!("Reload of {} failed: {}", self.path.display(), e);
            e
        })?;
        let ds = Arc::new(ds);
        *self.current.write() = Some(Arc::clone(&ds));
        log::info!("Dataset reloaded from {}", self.path.display());
        Ok(ds)
    }
}
