//! Tidegauge: sea-level series for dashboards that must always draw something.
//!
//! Tidegauge turns whatever a user hands it (an uploaded CSV of unknown
//! layout, a remote dataset, or nothing at all) into a canonical year/value
//! series. When real data is missing or unreadable, a deterministic
//! two-regime estimate takes its place.
//!
//! # Core Principles
//!
//! - **Ordered heuristics**: column roles are chosen by the first matching rule, never by scoring
//! - **Always renderable**: every failure degrades to the synthetic estimate
//! - **Explained**: every decision is returned as a diagnostic next to the result
//!
//! # Example
//!
//! ```no_run
//! use tidegauge::{SeriesLoader, SeriesRequest};
//!
//! let mut loader = SeriesLoader::new();
//! let bytes = std::fs::read("gmsl.csv").unwrap();
//! let loaded = loader.load(SeriesRequest::Upload { bytes, name: "gmsl.csv".into() });
//!
//! println!("Rows: {}", loaded.table.len());
//! for diagnostic in &loaded.diagnostics {
//!     println!("{}: {}", diagnostic.kind.label(), diagnostic.message);
//! }
//! ```

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod exposure;
pub mod inference;
pub mod input;
pub mod remote;
pub mod series;

mod loader;

pub use crate::loader::{
    DECODE_WARNING, INFERENCE_WARNING, LoadedSeries, LoaderConfig, REMOTE_WARNING, SeriesLoader,
    SeriesOrigin, SeriesRequest,
};
pub use cache::{CacheConfig, FetchKey, SeriesCache, SynthesisKey};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{RemoteFetchError, Result, TideError};
pub use exposure::{CoastalSite, ExposureSummary, SiteExposure, assess, default_sites};
pub use inference::{ColumnMapping, Inference, InferenceConfig, SchemaInferrer, YearSource};
pub use input::{Parser, ParserConfig, RawTable, SourceMetadata};
pub use remote::{FetchConfig, HttpSource, RemoteSource, StaticSource};
pub use series::{
    NoiseDecorator, Rebase, SeriesRow, SeriesSummary, SynthesisParams, TimeSeriesTable,
    default_series, synthesize, synthesize_with,
};
