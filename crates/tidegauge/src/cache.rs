//! Bounded, explicitly keyed result cache.
//!
//! Synthesized series are keyed by their exact parameters. Fetched bodies
//! are keyed by URL plus a coarse time bucket, so a cached download expires
//! when the bucket rolls over.

use std::hash::Hash;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::series::SynthesisParams;

/// Default number of entries per cache.
pub const DEFAULT_CAPACITY: usize = 32;
/// Default lifetime of a fetch bucket (one hour).
pub const DEFAULT_BUCKET_SECS: u64 = 3600;

/// Cache sizing and expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub bucket_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            bucket_secs: DEFAULT_BUCKET_SECS,
        }
    }
}

/// Exact identity of a synthesis request.
///
/// Rates are compared by bit pattern so `-0.0` and `0.0` are distinct keys
/// and every key is `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SynthesisKey {
    start_year: i32,
    end_year: i32,
    breakpoint_year: i32,
    rate_before: u64,
    rate_after: u64,
}

impl From<&SynthesisParams> for SynthesisKey {
    fn from(params: &SynthesisParams) -> Self {
        Self {
            start_year: params.start_year,
            end_year: params.end_year,
            breakpoint_year: params.breakpoint_year,
            rate_before: params.rate_before.to_bits(),
            rate_after: params.rate_after.to_bits(),
        }
    }
}

/// URL plus the time bucket the fetch happened in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub url: String,
    pub bucket: i64,
}

impl FetchKey {
    pub fn new(url: impl Into<String>, now: DateTime<Utc>, bucket_secs: u64) -> Self {
        let width = i64::try_from(bucket_secs.max(1)).unwrap_or(i64::MAX);
        Self {
            url: url.into(),
            bucket: now.timestamp().div_euclid(width),
        }
    }
}

/// Insertion-ordered map that evicts its oldest entry when full.
#[derive(Debug, Clone)]
pub struct SeriesCache<K, V> {
    entries: IndexMap<K, V>,
    capacity: usize,
}

impl<K: Hash + Eq, V: Clone> SeriesCache<K, V> {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, value);
    }

    /// Remove one entry, returning it if present.
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
