//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::store::UploadStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: UploadStore,
}

impl AppState {
    /// Create the application state, which also creates the upload
    /// working directory.
    pub fn new(config: Config) -> std::io::Result<Self> {
        let store = UploadStore::new(config.upload.dir.clone(), config.upload.ttl_minutes)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, store }),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upload store
    pub fn store(&self) -> &UploadStore {
        &self.inner.store
    }
}
