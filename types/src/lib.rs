//! Shared row types for skirmish reports.
//!
//! These are produced by `skirmish-core` and consumed by the CLI when rendering
//! summaries, so they live in a crate without any engine dependencies.

pub mod formatting;

use serde::{Deserialize, Serialize};

/// Per-unit statistics produced by the grouped aggregation.
///
/// Rounded fields are rounded when the row is built, so the values written to
/// the report are the values shown in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// None groups the records that carry no unit id
    pub unit_id: Option<i64>,
    /// Number of battle records for this unit (always > 0)
    pub count: i64,
    /// Kills per use, 4 decimal places
    pub efficiency: f64,
    /// 2 decimal places
    pub average_rating: f64,
    /// 2 decimal places
    pub median_rating: f64,
    pub total_kills: i64,
    pub min_rating: f64,
    pub max_rating: f64,
}

/// An [`AggregateRow`] with a resolved display name.
///
/// Field order matches the report CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub unit_name: String,
    pub unit_id: Option<i64>,
    pub count: i64,
    pub efficiency: f64,
    pub average_rating: f64,
    pub median_rating: f64,
    pub total_kills: i64,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl ReportRow {
    pub fn new(unit_name: String, row: &AggregateRow) -> Self {
        Self {
            unit_name,
            unit_id: row.unit_id,
            count: row.count,
            efficiency: row.efficiency,
            average_rating: row.average_rating,
            median_rating: row.median_rating,
            total_kills: row.total_kills,
            min_rating: row.min_rating,
            max_rating: row.max_rating,
        }
    }

    /// Strip the name, leaving the identifier-only aggregate.
    pub fn aggregate(&self) -> AggregateRow {
        AggregateRow {
            unit_id: self.unit_id,
            count: self.count,
            efficiency: self.efficiency,
            average_rating: self.average_rating,
            median_rating: self.median_rating,
            total_kills: self.total_kills,
            min_rating: self.min_rating,
            max_rating: self.max_rating,
        }
    }
}
