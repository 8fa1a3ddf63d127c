//! Fallback-always series loading.
//!
//! The loader is the one place that turns "the user uploaded something" or
//! "fetch the remote dataset" into a series that can be drawn. Every failure
//! on the way is recorded as a diagnostic and replaced by the synthetic
//! estimate, so [`SeriesLoader::load`] has no error path.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheConfig, FetchKey, SeriesCache, SynthesisKey};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{RemoteFetchError, Result, TideError};
use crate::inference::{ColumnMapping, InferenceConfig, SchemaInferrer};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::remote::{FetchConfig, Fetched, RemoteSource, fetch_first};
use crate::series::{
    SpliceReport, SynthesisParams, TimeSeriesTable, default_series, synthesize_with,
};

/// Shown when an upload cannot be read as a table.
pub const DECODE_WARNING: &str = "could not decode CSV, using estimate";
/// Shown when an upload was read but no series could be inferred from it.
pub const INFERENCE_WARNING: &str = "could not find sea-level columns, using estimate";
/// Shown when no remote candidate produced a usable series.
pub const REMOTE_WARNING: &str = "remote source unavailable, using estimate";

/// Configuration for the whole loading pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub parser: ParserConfig,
    /// Parameters of the synthetic estimate.
    pub synthesis: SynthesisParams,
    pub inference: InferenceConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    /// Splice fetched remote series onto the synthetic baseline.
    pub splice_remote: bool,
}

impl LoaderConfig {
    /// Read a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TideError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| TideError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        let file = File::create(path).map_err(|e| TideError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// What the caller wants rendered.
#[derive(Debug, Clone)]
pub enum SeriesRequest {
    /// Raw bytes of an uploaded delimited file.
    Upload { bytes: Vec<u8>, name: String },
    /// The configured remote candidates.
    Remote,
    /// The synthetic estimate.
    Synthetic,
}

/// Where the rendered series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrigin {
    Uploaded,
    Remote,
    /// Remote series laid over the synthetic baseline.
    Spliced,
    Synthetic,
}

/// A renderable series and how it was obtained.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedSeries {
    pub table: TimeSeriesTable,
    pub origin: SeriesOrigin,
    /// Column choices, when the series was inferred from a table.
    pub mapping: Option<ColumnMapping>,
    pub source: Option<SourceMetadata>,
    pub splice: Option<SpliceReport>,
    pub diagnostics: Diagnostics,
}

impl LoadedSeries {
    /// True for a fallback estimate or a series without calendar years.
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.contains(DiagnosticKind::SyntheticFallback)
            || self.mapping.as_ref().is_some_and(ColumnMapping::is_degraded)
    }

    /// True when the synthetic estimate stands in for requested data.
    pub fn is_fallback(&self) -> bool {
        self.diagnostics.contains(DiagnosticKind::SyntheticFallback)
    }
}

/// Inferred series before the loader decides how to present it.
struct Inferred {
    table: TimeSeriesTable,
    mapping: ColumnMapping,
    source: SourceMetadata,
}

/// Loads series from uploads, remote sources, or the synthesizer.
pub struct SeriesLoader {
    config: LoaderConfig,
    parser: Parser,
    inferrer: SchemaInferrer,
    remote: Option<Arc<dyn RemoteSource>>,
    synthesized: SeriesCache<SynthesisKey, TimeSeriesTable>,
    fetched: SeriesCache<FetchKey, Fetched>,
}

impl SeriesLoader {
    /// Create a loader with default configuration and no remote source.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        let inferrer = SchemaInferrer::with_config(config.inference.clone());
        let synthesized = SeriesCache::new(config.cache.capacity);
        let fetched = SeriesCache::new(config.cache.capacity);

        Self {
            config,
            parser,
            inferrer,
            remote: None,
            synthesized,
            fetched,
        }
    }

    /// Attach the source used for [`SeriesRequest::Remote`].
    pub fn with_remote(mut self, source: impl RemoteSource + 'static) -> Self {
        self.remote = Some(Arc::new(source));
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Produce a renderable series for `request`. Never fails.
    pub fn load(&mut self, request: SeriesRequest) -> LoadedSeries {
        self.load_at(request, Utc::now())
    }

    /// Like [`load`](Self::load) with an explicit clock for fetch-cache buckets.
    pub fn load_at(&mut self, request: SeriesRequest, now: DateTime<Utc>) -> LoadedSeries {
        let mut diagnostics = Diagnostics::new();

        match request {
            SeriesRequest::Synthetic => {
                let table = self.synthesize(&mut diagnostics);
                LoadedSeries {
                    table,
                    origin: SeriesOrigin::Synthetic,
                    mapping: None,
                    source: None,
                    splice: None,
                    diagnostics,
                }
            }
            SeriesRequest::Upload { bytes, name } => {
                match self.infer_bytes(&bytes, name, &mut diagnostics) {
                    Ok(inferred) => LoadedSeries {
                        table: inferred.table,
                        origin: SeriesOrigin::Uploaded,
                        mapping: Some(inferred.mapping),
                        source: Some(inferred.source),
                        splice: None,
                        diagnostics,
                    },
                    Err(err) => {
                        let warning = match &err {
                            TideError::NoMeasurementColumn { .. } | TideError::EmptySeries(_) => {
                                INFERENCE_WARNING
                            }
                            _ => {
                                diagnostics.push(Diagnostic::error(
                                    DiagnosticKind::DecodeFailed,
                                    err.to_string(),
                                ));
                                DECODE_WARNING
                            }
                        };
                        Self::fallback(warning, &err, diagnostics)
                    }
                }
            }
            SeriesRequest::Remote => match self.load_remote(now, &mut diagnostics) {
                Ok(loaded) => loaded,
                Err(err) => {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::RemoteUnavailable,
                        err.to_string(),
                    ));
                    Self::fallback(REMOTE_WARNING, &err, diagnostics)
                }
            },
        }
    }

    /// Drop every cached synthesis and download.
    pub fn clear_cache(&mut self) {
        self.synthesized.clear();
        self.fetched.clear();
    }

    /// Forget the cached synthesis for `params`. Returns whether one existed.
    pub fn invalidate_synthesis(&mut self, params: &SynthesisParams) -> bool {
        self.synthesized
            .invalidate(&SynthesisKey::from(params))
            .is_some()
    }

    /// Number of cached syntheses and downloads.
    pub fn cache_len(&self) -> (usize, usize) {
        (self.synthesized.len(), self.fetched.len())
    }

    /// The default-parameter estimate in place of data that could not be used.
    ///
    /// Configured synthesis parameters are ignored here; they only shape
    /// synthetic requests and the splice baseline.
    fn fallback(warning: &str, err: &TideError, mut diagnostics: Diagnostics) -> LoadedSeries {
        tracing::warn!(error = %err, recoverable = err.is_recoverable(), "{}", warning);
        diagnostics.push(Diagnostic::warning(DiagnosticKind::SyntheticFallback, warning));
        LoadedSeries {
            table: default_series(),
            origin: SeriesOrigin::Synthetic,
            mapping: None,
            source: None,
            splice: None,
            diagnostics,
        }
    }

    /// Cached synthesis with the configured parameters.
    ///
    /// Invalid parameters fall back to the defaults, which always validate.
    fn synthesize(&mut self, diagnostics: &mut Diagnostics) -> TimeSeriesTable {
        let params = self.config.synthesis;
        let key = SynthesisKey::from(&params);
        if let Some(table) = self.synthesized.get(&key) {
            tracing::debug!(?params, "synthesis cache hit");
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::CacheHit,
                "reused cached estimate",
            ));
            return table;
        }

        let table = match synthesize_with(&params) {
            Ok(table) => table,
            Err(err) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::SyntheticFallback,
                    format!("{}; default estimate used", err),
                ));
                return default_series();
            }
        };
        self.synthesized.insert(key, table.clone());
        table
    }

    fn infer_bytes(
        &self,
        bytes: &[u8],
        origin: String,
        diagnostics: &mut Diagnostics,
    ) -> Result<Inferred> {
        let parsed = self.parser.parse_bytes(bytes, origin)?;
        if parsed.decode_fallback {
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::DecodeFallback,
                format!("input decoded as {}", parsed.source.encoding),
            ));
        }

        let inference = self.inferrer.infer(&parsed.table)?;
        diagnostics.extend(inference.diagnostics);
        Ok(Inferred {
            table: inference.table,
            mapping: inference.mapping,
            source: parsed.source,
        })
    }

    fn load_remote(
        &mut self,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) -> Result<LoadedSeries> {
        let (fetched, cached) = self.fetch(now, diagnostics)?;
        let inferred = self.infer_bytes(&fetched.bytes, fetched.url.clone(), diagnostics)?;

        // Cache only bodies that yielded a series
        if !cached {
            let key = FetchKey::new(fetched.url.as_str(), now, self.config.cache.bucket_secs);
            self.fetched.insert(key, fetched);
        }

        if !self.config.splice_remote {
            return Ok(LoadedSeries {
                table: inferred.table,
                origin: SeriesOrigin::Remote,
                mapping: Some(inferred.mapping),
                source: Some(inferred.source),
                splice: None,
                diagnostics: std::mem::take(diagnostics),
            });
        }

        let baseline = self.synthesize(diagnostics);
        let (table, report) = TimeSeriesTable::splice(&baseline, &inferred.table);
        let message = match report.offset {
            Some(offset) => format!(
                "remote series shifted by {:.3} and spliced over {} baseline years",
                offset, report.replaced
            ),
            None => format!(
                "baseline does not cover the remote start year; spliced unshifted over {} years",
                report.replaced
            ),
        };
        diagnostics.push(Diagnostic::info(DiagnosticKind::Spliced, message));

        Ok(LoadedSeries {
            table,
            origin: SeriesOrigin::Spliced,
            mapping: Some(inferred.mapping),
            source: Some(inferred.source),
            splice: Some(report),
            diagnostics: std::mem::take(diagnostics),
        })
    }

    /// First candidate body, from the cache when its bucket is still current.
    ///
    /// The flag tells whether the body came from the cache. Fresh bodies are
    /// not cached here; the caller does that once they have been inferred.
    fn fetch(
        &self,
        now: DateTime<Utc>,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Fetched, bool)> {
        let source = self
            .remote
            .clone()
            .ok_or(TideError::RemoteFetch(RemoteFetchError::NoCandidates))?;
        let bucket_secs = self.config.cache.bucket_secs;

        for url in &self.config.fetch.urls {
            let key = FetchKey::new(url.as_str(), now, bucket_secs);
            if let Some(cached) = self.fetched.get(&key) {
                tracing::debug!(url = %url, "fetch cache hit");
                diagnostics.push(Diagnostic::info(
                    DiagnosticKind::CacheHit,
                    format!("reused download of {}", url),
                ));
                return Ok((cached, true));
            }
        }

        let fetched = fetch_first(source.as_ref(), &self.config.fetch.urls)?;
        for failure in &fetched.failures {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::CandidateFailed,
                failure.to_string(),
            ));
        }
        tracing::info!(
            source = source.name(),
            url = %fetched.url,
            bytes = fetched.bytes.len(),
            "remote dataset fetched"
        );
        Ok((fetched, false))
    }
}

impl Default for SeriesLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::YearSource;
    use crate::remote::StaticSource;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    const URL_A: &str = "https://a.example/gmsl.csv";
    const URL_B: &str = "https://b.example/gmsl.csv";

    fn upload(text: &str) -> SeriesRequest {
        SeriesRequest::Upload {
            bytes: text.as_bytes().to_vec(),
            name: "upload.csv".to_string(),
        }
    }

    fn remote_loader(source: StaticSource, splice: bool) -> SeriesLoader {
        SeriesLoader::with_config(LoaderConfig {
            fetch: FetchConfig {
                urls: vec![URL_A.to_string(), URL_B.to_string()],
                ..FetchConfig::default()
            },
            splice_remote: splice,
            ..LoaderConfig::default()
        })
        .with_remote(source)
    }

    #[test]
    fn test_synthetic_request() {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(SeriesRequest::Synthetic);

        assert_eq!(loaded.origin, SeriesOrigin::Synthetic);
        assert_eq!(loaded.table, default_series());
        assert!(!loaded.is_degraded());
    }

    #[test]
    fn test_synthesis_cached() {
        let mut loader = SeriesLoader::new();
        loader.load(SeriesRequest::Synthetic);
        let second = loader.load(SeriesRequest::Synthetic);

        assert!(second.diagnostics.contains(DiagnosticKind::CacheHit));
        assert_eq!(loader.cache_len(), (1, 0));
        assert!(loader.invalidate_synthesis(&SynthesisParams::default()));
        assert!(!loader.invalidate_synthesis(&SynthesisParams::default()));
    }

    #[test]
    fn test_upload_inferred() {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(upload("Year,GMSL\n1993,0.0\n1994,3.1\n"));

        assert_eq!(loaded.origin, SeriesOrigin::Uploaded);
        assert_eq!(loaded.table.value_at(1994), Some(3.1));
        let mapping = loaded.mapping.unwrap();
        assert_eq!(mapping.year, YearSource::Named("Year".into()));
        assert_eq!(loaded.source.unwrap().origin, "upload.csv");
    }

    #[test]
    fn test_undecodable_upload_falls_back() {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(SeriesRequest::Upload {
            bytes: vec![0xff, 0xfe, 0xfd, 0x80, 0x81],
            name: "garbage.csv".into(),
        });

        assert_eq!(loaded.origin, SeriesOrigin::Synthetic);
        assert_eq!(loaded.table, default_series());
        assert!(loaded.is_degraded());
        assert!(loaded.diagnostics.contains(DiagnosticKind::DecodeFailed));
        assert!(loaded.diagnostics.iter().any(|d| d.message == DECODE_WARNING));
    }

    #[test]
    fn test_no_measurement_falls_back_to_default_series() {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(upload("name,note\na,x\nb,y\n"));

        assert_eq!(loaded.table, default_series());
        assert!(loaded.diagnostics.iter().any(|d| d.message == INFERENCE_WARNING));
        assert!(!loaded.diagnostics.contains(DiagnosticKind::DecodeFailed));
    }

    #[test]
    fn test_euc_kr_upload() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("연도,해수면\n2001,5\n2002,6\n");
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(SeriesRequest::Upload {
            bytes: bytes.into_owned(),
            name: "korean.csv".into(),
        });

        assert_eq!(loaded.origin, SeriesOrigin::Uploaded);
        assert_eq!(loaded.table.value_at(2002), Some(6.0));
        assert!(loaded.diagnostics.contains(DiagnosticKind::DecodeFallback));
    }

    #[test]
    fn test_remote_without_source_falls_back() {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(SeriesRequest::Remote);

        assert_eq!(loaded.origin, SeriesOrigin::Synthetic);
        assert!(loaded.diagnostics.contains(DiagnosticKind::RemoteUnavailable));
        assert!(loaded.diagnostics.iter().any(|d| d.message == REMOTE_WARNING));
    }

    #[test]
    fn test_remote_second_candidate() {
        let source = StaticSource::new()
            .with_status(URL_A, 503)
            .with_body(URL_B, "year,gmsl\n1993,0\n1994,3\n");
        let mut loader = remote_loader(source, false);
        let loaded = loader.load(SeriesRequest::Remote);

        assert_eq!(loaded.origin, SeriesOrigin::Remote);
        assert_eq!(loaded.table.len(), 2);
        assert!(loaded.diagnostics.contains(DiagnosticKind::CandidateFailed));
        assert_eq!(loaded.source.unwrap().origin, URL_B);
    }

    #[test]
    fn test_remote_failures_fall_back() {
        let source = StaticSource::new().with_timeout(URL_A).with_body(URL_B, "");
        let mut loader = remote_loader(source, false);
        let loaded = loader.load(SeriesRequest::Remote);

        assert_eq!(loaded.origin, SeriesOrigin::Synthetic);
        assert_eq!(loaded.table, default_series());
        assert!(loaded.diagnostics.iter().any(|d| d.message == REMOTE_WARNING));
    }

    #[test]
    fn test_remote_splice() {
        let source = StaticSource::new().with_body(URL_A, "year,gmsl\n1993,0\n1994,3\n");
        let mut loader = remote_loader(source, true);
        let loaded = loader.load(SeriesRequest::Remote);

        assert_eq!(loaded.origin, SeriesOrigin::Spliced);
        let baseline = default_series();
        assert_eq!(loaded.table.len(), baseline.len());
        assert_eq!(loaded.table.value_at(1993), baseline.value_at(1993));
        let expected_1994 = baseline.value_at(1993).unwrap() + 3.0;
        assert!((loaded.table.value_at(1994).unwrap() - expected_1994).abs() < 1e-9);
        assert_eq!(loaded.splice.unwrap().replaced, 2);
        assert!(loaded.diagnostics.contains(DiagnosticKind::Spliced));
    }

    #[test]
    fn test_fetch_cache_expires_with_bucket() {
        let source = StaticSource::new().with_body(URL_A, "year,gmsl\n1993,0\n");
        let mut loader = remote_loader(source, false);
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        loader.load_at(SeriesRequest::Remote, t0);
        let hit = loader.load_at(SeriesRequest::Remote, t0 + Duration::minutes(5));
        assert!(hit.diagnostics.contains(DiagnosticKind::CacheHit));

        let miss = loader.load_at(SeriesRequest::Remote, t0 + Duration::hours(2));
        assert!(!miss.diagnostics.contains(DiagnosticKind::CacheHit));
        assert_eq!(loader.cache_len().1, 2);
    }

    #[test]
    fn test_unusable_remote_body_not_cached() {
        let source = StaticSource::new().with_body(URL_A, "name,note\na,x\n");
        let mut loader = remote_loader(source, false);
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let first = loader.load_at(SeriesRequest::Remote, t0);
        assert!(first.is_fallback());
        assert_eq!(loader.cache_len().1, 0);

        let second = loader.load_at(SeriesRequest::Remote, t0 + Duration::minutes(5));
        assert!(second.is_fallback());
        assert!(!second.diagnostics.contains(DiagnosticKind::CacheHit));
        assert_eq!(loader.cache_len().1, 0);
    }

    #[test]
    fn test_fallback_ignores_configured_synthesis() {
        let custom = SynthesisParams {
            rate_after: 4.0,
            ..SynthesisParams::default()
        };
        let mut loader = SeriesLoader::with_config(LoaderConfig {
            synthesis: custom,
            ..LoaderConfig::default()
        });

        let fallback = loader.load(upload("name,note\na,x\n"));
        assert_eq!(fallback.table, default_series());

        let synthetic = loader.load(SeriesRequest::Synthetic);
        assert_eq!(synthetic.table, synthesize_with(&custom).unwrap());
    }

    #[test]
    fn test_invalid_synthesis_params_use_defaults() {
        let mut loader = SeriesLoader::with_config(LoaderConfig {
            synthesis: SynthesisParams {
                start_year: 2000,
                breakpoint_year: 1990,
                ..SynthesisParams::default()
            },
            ..LoaderConfig::default()
        });
        let loaded = loader.load(SeriesRequest::Synthetic);
        assert_eq!(loaded.table, default_series());
        assert!(loaded.diagnostics.contains(DiagnosticKind::SyntheticFallback));
    }

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tidegauge.json");
        let config = LoaderConfig {
            splice_remote: true,
            fetch: FetchConfig {
                urls: vec![URL_A.into()],
                timeout_secs: 3,
            },
            ..LoaderConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = LoaderConfig::load(&path).unwrap();
        assert!(loaded.splice_remote);
        assert_eq!(loaded.fetch.urls, vec![URL_A.to_string()]);
        assert_eq!(loaded.fetch.timeout_secs, 3);
        assert_eq!(loaded.synthesis, SynthesisParams::default());
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"synthesis": {"rate_after": 3.4}}"#).unwrap();

        let config = LoaderConfig::load(&path).unwrap();
        assert_eq!(config.synthesis.rate_after, 3.4);
        assert_eq!(config.synthesis.start_year, 1900);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let err = LoaderConfig::load("/nonexistent/tidegauge.json").unwrap_err();
        assert!(matches!(err, TideError::Io { .. }));
    }
}
