//! Schema inference for uploaded and fetched tables.

mod inferrer;
mod profile;
mod rules;

pub use inferrer::{
    ColumnMapping, DuplicatePolicy, Inference, InferenceConfig, SchemaInferrer, YearSource,
};
pub use profile::{ColumnProfile, parse_number, parse_year};
pub use rules::{
    ColumnRole, MEASUREMENT_TOKENS, NameMatches, RoleRule, RuleSet, UnitHint, YEAR_TOKENS,
    default_unit_hints, unit_for,
};
