//! Remote source trait and candidate iteration.

use serde::{Deserialize, Serialize};

use crate::error::RemoteFetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for remote fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Candidate URLs, tried in order; the first success wins.
    pub urls: Vec<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Something that can turn a URL into bytes.
///
/// Implementations must be thread-safe (Send + Sync) so a loader can be
/// shared behind a lock.
pub trait RemoteSource: Send + Sync {
    /// Retrieve the body at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError>;

    /// Get the name of this source (for logging/debugging).
    fn name(&self) -> &str;
}

/// Body of the first candidate that answered.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: String,
    pub bytes: Vec<u8>,
    /// Failures of earlier candidates, in order.
    pub failures: Vec<RemoteFetchError>,
}

/// Try each URL in order and return the first non-empty body.
pub fn fetch_first(
    source: &dyn RemoteSource,
    urls: &[String],
) -> Result<Fetched, RemoteFetchError> {
    if urls.is_empty() {
        return Err(RemoteFetchError::NoCandidates);
    }

    let mut failures = Vec::new();
    for url in urls {
        tracing::debug!(source = source.name(), url = %url, "fetching candidate");
        match source.fetch(url) {
            Ok(bytes) if bytes.is_empty() => {
                failures.push(RemoteFetchError::EmptyBody { url: url.clone() });
            }
            Ok(bytes) => {
                return Ok(Fetched {
                    url: url.clone(),
                    bytes,
                    failures,
                });
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "candidate failed");
                failures.push(e);
            }
        }
    }

    Err(RemoteFetchError::AllCandidatesFailed(failures))
}
