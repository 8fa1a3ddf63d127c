//! Series handlers: synthetic estimate, uploads, and the remote dataset.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use tidegauge::{
    Diagnostics, LoadedSeries, NoiseDecorator, SeriesOrigin, SeriesRequest, SynthesisParams,
    synthesize_with,
};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// A loaded series plus a flag for front ends that only need to know
/// whether to show a "using estimate" banner.
#[derive(Serialize)]
pub struct SeriesResponse {
    #[serde(flatten)]
    pub loaded: LoadedSeries,
    pub degraded: bool,
}

impl From<LoadedSeries> for SeriesResponse {
    fn from(loaded: LoadedSeries) -> Self {
        let degraded = loaded.is_degraded();
        Self { loaded, degraded }
    }
}

/// Optional overrides for the synthetic estimate.
#[derive(Debug, Default, Deserialize)]
pub struct SynthQuery {
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub breakpoint: Option<i32>,
    pub rate_before: Option<f64>,
    pub rate_after: Option<f64>,
    pub noise: Option<f64>,
    pub seed: Option<u64>,
}

impl SynthQuery {
    fn has_overrides(&self) -> bool {
        self.start.is_some()
            || self.end.is_some()
            || self.breakpoint.is_some()
            || self.rate_before.is_some()
            || self.rate_after.is_some()
    }

    fn apply(&self, base: SynthesisParams) -> SynthesisParams {
        SynthesisParams {
            start_year: self.start.unwrap_or(base.start_year),
            end_year: self.end.unwrap_or(base.end_year),
            breakpoint_year: self.breakpoint.unwrap_or(base.breakpoint_year),
            rate_before: self.rate_before.unwrap_or(base.rate_before),
            rate_after: self.rate_after.unwrap_or(base.rate_after),
        }
    }
}

/// Get the synthetic estimate, optionally with other parameters or noise.
///
/// Without overrides this goes through the loader and its cache. Explicit
/// parameters are validated and rejected with 422 when out of range.
pub async fn get_synthetic(
    State(state): State<AppState>,
    Query(query): Query<SynthQuery>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let mut loaded = if query.has_overrides() {
        let base = state.with_loader(|loader| loader.config().synthesis).await?;
        let params = query.apply(base);
        LoadedSeries {
            table: synthesize_with(&params)?,
            origin: SeriesOrigin::Synthetic,
            mapping: None,
            source: None,
            splice: None,
            diagnostics: Diagnostics::new(),
        }
    } else {
        state
            .with_loader(|loader| loader.load(SeriesRequest::Synthetic))
            .await?
    };

    if let Some(sigma) = query.noise {
        let seed = query.seed.unwrap_or(tidegauge::series::DEFAULT_SEED);
        loaded.table = NoiseDecorator::new(sigma, seed).apply(&loaded.table)?;
    }

    Ok(Json(loaded.into()))
}

#[derive(Debug, Deserialize)]
pub struct InferQuery {
    /// Upload name recorded in the source metadata.
    pub name: Option<String>,
}

/// Infer a series from an uploaded CSV body.
pub async fn infer_upload(
    State(state): State<AppState>,
    Query(query): Query<InferQuery>,
    body: Bytes,
) -> Result<Json<SeriesResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("request body is empty".to_string()));
    }

    let request = SeriesRequest::Upload {
        bytes: body.to_vec(),
        name: query.name.unwrap_or_else(|| "upload".to_string()),
    };
    let loaded = state.with_loader(move |loader| loader.load(request)).await?;
    Ok(Json(loaded.into()))
}

/// Get the remote dataset, or the estimate when it is unavailable.
pub async fn get_remote(State(state): State<AppState>) -> Result<Json<SeriesResponse>, ApiError> {
    let loaded = state
        .with_loader(|loader| loader.load(SeriesRequest::Remote))
        .await?;
    Ok(Json(loaded.into()))
}
