//! Blocking HTTP source.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use super::source::{FetchConfig, RemoteSource};
use crate::error::{RemoteFetchError, Result, TideError};

/// Fetches datasets over HTTP(S) with a bounded timeout.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a source with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(Self::build_headers())
            .build()
            .map_err(|e| TideError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/csv, text/plain;q=0.9, */*;q=0.5"),
        );
        headers
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, RemoteFetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                RemoteFetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RemoteFetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|e| {
            if e.is_timeout() {
                RemoteFetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                RemoteFetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if body.is_empty() {
            return Err(RemoteFetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
