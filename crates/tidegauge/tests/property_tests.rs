//! Property-based tests for synthesis, inference, and series operations.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p tidegauge --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p tidegauge --test property_tests
//! ```

use proptest::prelude::*;

use tidegauge::inference::{parse_number, parse_year};
use tidegauge::{
    NoiseDecorator, RawTable, Rebase, SchemaInferrer, SeriesLoader, SeriesRequest, SeriesRow,
    TimeSeriesTable, assess, default_sites, synthesize,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Valid synthesis parameters: start < breakpoint <= end, modest rates.
fn synthesis_params() -> impl Strategy<Value = (i32, i32, i32, f64, f64)> {
    (1700i32..2000, 1i32..150, 0i32..150, -5.0f64..10.0, -5.0f64..10.0).prop_map(
        |(start, to_break, after, before_rate, after_rate)| {
            let breakpoint = start + to_break;
            (start, breakpoint + after, breakpoint, before_rate, after_rate)
        },
    )
}

/// A small series with unique years.
fn series() -> impl Strategy<Value = TimeSeriesTable> {
    prop::collection::btree_map(1800i32..2100, -1000.0f64..1000.0, 1..60).prop_map(|map| {
        TimeSeriesTable::new(map.into_iter().map(|(y, v)| SeriesRow::new(y, v)).collect())
            .expect("unique finite rows")
    })
}

/// Arbitrary short cell text.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "-?[0-9]{1,3}\\.[0-9]{1,3}",
        "[a-zA-Z ]{0,8}",
        Just(String::new()),
        Just("NA".to_string()),
    ]
}

// =============================================================================
// Synthesizer
// =============================================================================

proptest! {
    #[test]
    fn synthesized_series_starts_at_zero((start, end, bp, before, after) in synthesis_params()) {
        let table = synthesize(start, end, bp, before, after).unwrap();
        prop_assert_eq!(table.len() as i32, end - start + 1);
        prop_assert_eq!(table.first().unwrap().value, 0.0);
    }

    #[test]
    fn synthesized_series_is_monotone_for_non_negative_rates(
        (start, end, bp, before, after) in synthesis_params()
    ) {
        let table = synthesize(start, end, bp, before.abs(), after.abs()).unwrap();
        let values: Vec<f64> = table.values().collect();
        prop_assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn synthesized_series_survives_inference((start, end, bp, before, after) in synthesis_params()) {
        let table = synthesize(start, end, bp, before, after).unwrap();
        let raw = RawTable::from_series(&table, "year", "gmsl_mm");
        let inferred = SchemaInferrer::new().infer(&raw).unwrap();
        prop_assert_eq!(inferred.table, table);
    }

    #[test]
    fn invalid_ordering_is_rejected(start in 1800i32..2100, back in 0i32..50) {
        prop_assert!(synthesize(start, start + 10, start - back, 1.0, 1.0).is_err());
    }
}

// =============================================================================
// Series Operations
// =============================================================================

proptest! {
    #[test]
    fn rebase_is_idempotent(table in series()) {
        let once = table.rebase(Rebase::FirstRow);
        prop_assert_eq!(once.first().unwrap().value, 0.0);
        prop_assert_eq!(once.rebase(Rebase::FirstRow), once);
    }

    #[test]
    fn clip_keeps_only_years_in_range(table in series(), a in 1800i32..2100, b in 1800i32..2100) {
        let (start, end) = (a.min(b), a.max(b));
        let clipped = table.clip(start, end);
        prop_assert!(clipped.years().all(|y| y >= start && y <= end));
        prop_assert_eq!(
            clipped.len(),
            table.years().filter(|&y| y >= start && y <= end).count()
        );
    }

    #[test]
    fn splice_keeps_years_unique_and_sorted(baseline in series(), remote in series()) {
        let (spliced, report) = TimeSeriesTable::splice(&baseline, &remote);
        let years: Vec<i32> = spliced.years().collect();
        prop_assert!(years.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(spliced.len(), baseline.len() + report.appended);
        for year in remote.years() {
            prop_assert!(spliced.contains_year(year));
        }
    }

    #[test]
    fn noise_is_reproducible(table in series(), seed in any::<u64>(), sigma in 0.0f64..5.0) {
        let noise = NoiseDecorator::new(sigma, seed);
        prop_assert_eq!(noise.apply(&table).unwrap(), noise.apply(&table).unwrap());
    }
}

// =============================================================================
// Parsing and Inference Never Panic
// =============================================================================

proptest! {
    #[test]
    fn cell_parsers_never_panic(s in "\\PC{0,20}") {
        let _ = parse_number(&s);
        let _ = parse_year(&s);
    }

    #[test]
    fn parsed_numbers_are_finite(s in "\\PC{0,20}") {
        if let Some(v) = parse_number(&s) {
            prop_assert!(v.is_finite());
        }
    }

    #[test]
    fn inferred_tables_are_sorted_and_unique(
        headers in prop::collection::vec("[a-z_]{1,8}", 1..5),
        cells in prop::collection::vec(prop::collection::vec(cell(), 5), 1..30),
    ) {
        let width = headers.len();
        let rows = cells
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        let raw = RawTable::new(headers, rows);

        if let Ok(inference) = SchemaInferrer::new().infer(&raw) {
            let years: Vec<i32> = inference.table.years().collect();
            prop_assert!(!years.is_empty());
            prop_assert!(years.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(inference.table.values().all(f64::is_finite));
        }
    }

    #[test]
    fn loader_always_renders(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut loader = SeriesLoader::new();
        let loaded = loader.load(SeriesRequest::Upload { bytes, name: "fuzz.csv".into() });
        prop_assert!(!loaded.table.is_empty());
    }

    #[test]
    fn exposure_flags_match_threshold(rise in -10.0f64..10.0) {
        let clamped = rise.clamp(0.0, 5.0);
        for exposure in assess(&default_sites(), rise) {
            prop_assert_eq!(exposure.inundated, exposure.site.elevation_m <= clamped);
        }
    }
}
