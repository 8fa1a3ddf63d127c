//! In-memory source for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::source::RemoteSource;
use crate::error::RemoteFetchError;

#[derive(Debug, Clone)]
enum Canned {
    Body(Vec<u8>),
    Status(u16),
    Timeout,
}

/// Serves canned responses keyed by URL; unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: HashMap<String, Canned>,
    requests: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), Canned::Body(body.into()));
        self
    }

    /// Answer `url` with an HTTP status.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Canned::Status(status));
        self
    }

    /// Make `url` time out.
    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Canned::Timeout);
        self
    }

    /// Number of fetches served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RemoteSource for StaticSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url) {
            Some(Canned::Body(bytes)) => Ok(bytes.clone()),
            Some(Canned::Status(status)) => Err(RemoteFetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(Canned::Timeout) => Err(RemoteFetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(RemoteFetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}
