//! Application state for the web server.

use std::sync::{Arc, Mutex};

use tidegauge::{CoastalSite, SeriesLoader, default_sites};

use super::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The loader and its caches. Locked from blocking tasks only.
    pub loader: Arc<Mutex<SeriesLoader>>,
    /// Sites shown on the exposure map.
    pub sites: Arc<Vec<CoastalSite>>,
}

impl AppState {
    /// Create new application state with the sample coastal sites.
    pub fn new(loader: SeriesLoader) -> Self {
        Self {
            loader: Arc::new(Mutex::new(loader)),
            sites: Arc::new(default_sites()),
        }
    }

    /// Run `f` against the loader on the blocking pool.
    ///
    /// Loading may perform a blocking HTTP request, so it never runs on an
    /// async worker thread. The lock is held for the whole load, including a
    /// remote fetch of up to `timeout_secs` per candidate; other requests wait
    /// behind it. The server is a single-user data feed, so requests are
    /// serialized rather than fanned out.
    pub async fn with_loader<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut SeriesLoader) -> T + Send + 'static,
        T: Send + 'static,
    {
        let loader = Arc::clone(&self.loader);
        tokio::task::spawn_blocking(move || {
            let mut guard = loader
                .lock()
                .map_err(|_| ApiError::Internal("loader lock poisoned".to_string()))?;
            Ok(f(&mut guard))
        })
        .await
        .map_err(|e| ApiError::Internal(format!("loader task failed: {}", e)))?
    }
}
