//! Column-name rules: which tokens mark which role, and which mark a unit.
//!
//! Rules are evaluated once per table. For each role the result is the list
//! of matching columns in declaration order; the inferrer takes the first
//! eligible one.

use serde::{Deserialize, Serialize};

/// Name tokens that mark a temporal column.
pub const YEAR_TOKENS: &[&str] = &["year", "연도", "년도"];

/// Name tokens that mark a sea-level measurement column.
pub const MEASUREMENT_TOKENS: &[&str] = &["sea", "해수", "해수면", "msl", "level", "gmsl", "mm", "연평균"];

/// Semantic role a column can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Year,
    Measurement,
}

/// A token set mapped to a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: ColumnRole,
    pub tokens: Vec<String>,
}

impl RoleRule {
    pub fn new(role: ColumnRole, tokens: &[&str]) -> Self {
        Self {
            role,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Whether the lowercased column name contains any token.
    pub fn matches(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.tokens
            .iter()
            .any(|token| lower.contains(&token.to_lowercase()))
    }
}

/// Multiplier applied when a measurement header carries a unit token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitHint {
    pub token: String,
    pub multiplier: f64,
}

impl UnitHint {
    pub fn new(token: impl Into<String>, multiplier: f64) -> Self {
        Self {
            token: token.into(),
            multiplier,
        }
    }
}

/// Centimetre headers are rescaled to millimetres.
pub fn default_unit_hints() -> Vec<UnitHint> {
    vec![UnitHint::new("cm", 10.0)]
}

/// First unit hint whose token appears in the header as a unit annotation.
///
/// The token must not be bordered by ASCII letters, so `(cm)`, `_cm` and
/// `[cm]` match while `cmems_sea_level` does not.
pub fn unit_for<'a>(hints: &'a [UnitHint], name: &str) -> Option<&'a UnitHint> {
    let lower = name.to_lowercase();
    hints
        .iter()
        .find(|hint| has_unit_token(&lower, &hint.token.to_lowercase()))
}

fn has_unit_token(header: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    header.match_indices(token).any(|(start, _)| {
        let before = header[..start].chars().next_back();
        let after = header[start + token.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphabetic())
            && !after.is_some_and(|c| c.is_ascii_alphabetic())
    })
}

/// Columns matching each role, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMatches {
    pub year: Vec<usize>,
    pub measurement: Vec<usize>,
}

/// Ordered role rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<RoleRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<RoleRule>) -> Self {
        Self { rules }
    }

    /// Match every header against every rule once.
    pub fn resolve(&self, headers: &[String]) -> NameMatches {
        let mut matches = NameMatches::default();
        for (idx, header) in headers.iter().enumerate() {
            for rule in &self.rules {
                if !rule.matches(header) {
                    continue;
                }
                let bucket = match rule.role {
                    ColumnRole::Year => &mut matches.year,
                    ColumnRole::Measurement => &mut matches.measurement,
                };
                if !bucket.contains(&idx) {
                    bucket.push(idx);
                }
            }
        }
        matches
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(vec![
            RoleRule::new(ColumnRole::Year, YEAR_TOKENS),
            RoleRule::new(ColumnRole::Measurement, MEASUREMENT_TOKENS),
        ])
    }
}
