//! Coastal exposure handler.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use tidegauge::ExposureSummary;

use crate::server::state::AppState;

/// Rise used when the query omits one, metres.
const DEFAULT_RISE_M: f64 = 1.0;

#[derive(Debug, Deserialize)]
pub struct ExposureQuery {
    pub rise: Option<f64>,
}

/// Get the threshold comparison for every site.
pub async fn get_exposure(
    State(state): State<AppState>,
    Query(query): Query<ExposureQuery>,
) -> Json<ExposureSummary> {
    let rise = query.rise.unwrap_or(DEFAULT_RISE_M);
    Json(ExposureSummary::new(&state.sites, rise))
}
