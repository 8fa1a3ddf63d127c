//! Remote dataset retrieval.
//!
//! Fetching is a blocking call guarded at this boundary: every failure is a
//! [`RemoteFetchError`](crate::RemoteFetchError) and never escapes the loader,
//! which falls back to the synthetic estimate instead.
//!
//! # Sources
//!
//! - [`HttpSource`] - blocking HTTP(S) client with a short timeout
//! - [`StaticSource`] - in-memory bytes keyed by URL, for tests and offline demos

mod fixture;
mod http;
mod source;

pub use fixture::StaticSource;
pub use http::HttpSource;
pub use source::{FetchConfig, Fetched, RemoteSource, fetch_first};
