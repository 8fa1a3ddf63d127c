//! Coastal exposure threshold for the map view.
//!
//! A site counts as inundated when its reference elevation does not exceed
//! the chosen sea-level rise. This is a threshold comparison for display,
//! not an inundation model.

use serde::{Deserialize, Serialize};

/// Smallest rise the map slider offers, metres.
pub const MIN_RISE_M: f64 = 0.0;
/// Largest rise the map slider offers, metres.
pub const MAX_RISE_M: f64 = 5.0;

/// A named coastal location with a fixed reference elevation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoastalSite {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Elevation above mean sea level, metres.
    pub elevation_m: f64,
}

impl CoastalSite {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, elevation_m: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            elevation_m,
        }
    }
}

/// Sample Korean coastal cities.
pub fn default_sites() -> Vec<CoastalSite> {
    vec![
        CoastalSite::new("Incheon", 37.4563, 126.7052, 1.5),
        CoastalSite::new("Busan", 35.1796, 129.0756, 3.0),
        CoastalSite::new("Mokpo", 34.8110, 126.3929, 1.2),
        CoastalSite::new("Yeosu", 34.7604, 127.6623, 2.0),
        CoastalSite::new("Gangneung", 37.7519, 128.8761, 4.0),
    ]
}

/// Threshold outcome for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteExposure {
    pub site: CoastalSite,
    pub inundated: bool,
}

/// Clamp a requested rise to the slider range. NaN reads as no rise.
pub fn clamp_rise(rise_m: f64) -> f64 {
    if rise_m.is_nan() {
        return MIN_RISE_M;
    }
    rise_m.clamp(MIN_RISE_M, MAX_RISE_M)
}

/// Compare every site against `rise_m`, clamped to the slider range.
pub fn assess(sites: &[CoastalSite], rise_m: f64) -> Vec<SiteExposure> {
    let rise = clamp_rise(rise_m);
    sites
        .iter()
        .map(|site| SiteExposure {
            site: site.clone(),
            inundated: site.elevation_m <= rise,
        })
        .collect()
}

/// Aggregate view of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureSummary {
    /// The clamped rise actually applied.
    pub rise_m: f64,
    pub total: usize,
    pub inundated: usize,
    /// Mean site position, for centring the map.
    pub centroid: Option<(f64, f64)>,
    pub sites: Vec<SiteExposure>,
}

impl ExposureSummary {
    pub fn new(sites: &[CoastalSite], rise_m: f64) -> Self {
        let assessed = assess(sites, rise_m);
        let centroid = if sites.is_empty() {
            None
        } else {
            let n = sites.len() as f64;
            Some((
                sites.iter().map(|s| s.lat).sum::<f64>() / n,
                sites.iter().map(|s| s.lon).sum::<f64>() / n,
            ))
        };

        Self {
            rise_m: clamp_rise(rise_m),
            total: assessed.len(),
            inundated: assessed.iter().filter(|e| e.inundated).count(),
            centroid,
            sites: assessed,
        }
    }
}
