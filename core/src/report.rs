//! Joining aggregate rows with unit names and writing the report CSV.

use std::path::{Path, PathBuf};

use skirmish_types::{AggregateRow, ReportRow};

use crate::catalog::{UnitCatalog, placeholder_name};
use crate::error::{AnalysisError, Result};

/// Suffix appended to the dataset stem for the named report
pub const REPORT_SUFFIX: &str = "_analysis_with_names";

/// Column order of the report CSV
pub const REPORT_COLUMNS: [&str; 9] = [
    "unit_name",
    "unit_id",
    "count",
    "efficiency",
    "average_rating",
    "median_rating",
    "total_kills",
    "min_rating",
    "max_rating",
];

/// Final analysis output.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Every unit, with names resolved
    Named(Vec<ReportRow>),
    /// Catalog unavailable: top units by id only
    IdOnly(Vec<AggregateRow>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Self::Named(rows) => rows.len(),
            Self::IdOnly(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_names(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    /// First `n` rows in report order.
    pub fn top(&self, n: usize) -> Report {
        match self {
            Self::Named(rows) => Self::Named(rows.iter().take(n).cloned().collect()),
            Self::IdOnly(rows) => Self::IdOnly(rows.iter().take(n).cloned().collect()),
        }
    }

    /// Aggregate values regardless of whether names were attached.
    pub fn aggregates(&self) -> Vec<AggregateRow> {
        match self {
            Self::Named(rows) => rows.iter().map(ReportRow::aggregate).collect(),
            Self::IdOnly(rows) => rows.clone(),
        }
    }
}

/// Stands in for the id in the placeholder name of the id-less group
pub const MISSING_ID_LABEL: &str = "(no id)";

/// Resolve a display name by exact id lookup, or the placeholder.
///
/// Records without an id resolve to `Unknown Unit (no id)`; in the CSV their
/// `unit_id` cell is left empty.
pub fn resolve_name(catalog: &UnitCatalog, unit_id: Option<i64>) -> String {
    let Some(id) = unit_id else {
        return placeholder_name(MISSING_ID_LABEL);
    };
    catalog
        .name_for(id)
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_name(id))
}

/// Attach names to every row, keeping row order.
pub fn enrich(rows: &[AggregateRow], catalog: &UnitCatalog) -> Vec<ReportRow> {
    rows.iter()
        .map(|row| ReportRow::new(resolve_name(catalog, row.unit_id), row))
        .collect()
}

/// Report path for a dataset: `units.parquet` → `units_analysis_with_names.csv`.
pub fn report_path_for(parquet_path: &Path) -> PathBuf {
    let stem = parquet_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parquet_path.with_file_name(format!("{stem}{REPORT_SUFFIX}.csv"))
}

/// Write the full named report with a header row.
pub fn write_report_csv(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    // Header comes from the serde field names; write it explicitly so an empty
    // report still has one
    if rows.is_empty() {
        writer.write_record(REPORT_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| AnalysisError::io(path, e))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}
