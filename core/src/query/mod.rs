//! Query module for aggregating battle records with DataFusion.
//!
//! The Parquet dataset is registered as the `battles` table and queried with
//! SQL. Results come back as Arrow batches and are read out with the column
//! extractors below.

mod unit_stats;

use std::path::Path;

use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array, UInt64Array};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::*;

use crate::error::{AnalysisError, Result};

pub use skirmish_types::AggregateRow;
pub use unit_stats::analyze_units;

/// Table name the dataset is registered under
pub const BATTLES_TABLE: &str = "battles";

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ─────────────────────────────────────────────────────────────────────────────
// Generic Column Extractors (handles Arrow type variations automatically)
// ─────────────────────────────────────────────────────────────────────────────

fn col_i64(batch: &RecordBatch, idx: usize) -> Result<Vec<i64>> {
    let col = batch.column(idx);
    if let Some(a) = col.as_any().downcast_ref::<Int64Array>() {
        return Ok((0..a.len()).map(|i| a.value(i)).collect());
    }
    if let Some(a) = col.as_any().downcast_ref::<Int32Array>() {
        return Ok((0..a.len()).map(|i| a.value(i) as i64).collect());
    }
    if let Some(a) = col.as_any().downcast_ref::<UInt64Array>() {
        return Ok((0..a.len()).map(|i| a.value(i) as i64).collect());
    }
    Err(AnalysisError::Query(format!(
        "col {idx}: expected int, got {:?}",
        col.data_type()
    )))
}

/// Nullable integer column, for group keys that may be NULL.
fn col_opt_i64(batch: &RecordBatch, idx: usize) -> Result<Vec<Option<i64>>> {
    let col = batch.column(idx);
    if let Some(a) = col.as_any().downcast_ref::<Int64Array>() {
        return Ok(a.iter().collect());
    }
    if let Some(a) = col.as_any().downcast_ref::<Int32Array>() {
        return Ok(a.iter().map(|v| v.map(i64::from)).collect());
    }
    Err(AnalysisError::Query(format!(
        "col {idx}: expected int, got {:?}",
        col.data_type()
    )))
}

/// Float column; NULLs (e.g. a group whose ratings are all missing) read as NaN.
fn col_f64(batch: &RecordBatch, idx: usize) -> Result<Vec<f64>> {
    let col = batch.column(idx);
    if let Some(a) = col.as_any().downcast_ref::<Float64Array>() {
        return Ok(a.iter().map(|v| v.unwrap_or(f64::NAN)).collect());
    }
    if let Some(a) = col.as_any().downcast_ref::<Float32Array>() {
        return Ok(a.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect());
    }
    if let Some(a) = col.as_any().downcast_ref::<Int64Array>() {
        return Ok(a.iter().map(|v| v.map_or(f64::NAN, |v| v as f64)).collect());
    }
    Err(AnalysisError::Query(format!(
        "col {idx}: expected float, got {:?}",
        col.data_type()
    )))
}

// ─────────────────────────────────────────────────────────────────────────────
// Query Executor
// ─────────────────────────────────────────────────────────────────────────────

/// A DataFusion session over one battle dataset.
///
/// The session lives as long as this value; dropping it releases the engine
/// on every exit path.
pub struct UnitQuery {
    ctx: SessionContext,
}

impl Default for UnitQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitQuery {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new(),
        }
    }

    pub async fn register_parquet(&self, path: &Path) -> Result<()> {
        // Accept whatever extension the file actually has
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let options = ParquetReadOptions {
            file_extension: &extension,
            ..Default::default()
        };
        self.ctx
            .register_parquet(BATTLES_TABLE, &path.to_string_lossy(), options)
            .await?;
        Ok(())
    }

    /// Register an in-memory batch as the dataset (used by tests).
    pub fn register_batch(&self, batch: RecordBatch) -> Result<()> {
        self.ctx.register_batch(BATTLES_TABLE, batch)?;
        Ok(())
    }

    async fn sql(&self, query: &str) -> Result<Vec<RecordBatch>> {
        let df = self.ctx.sql(query).await?;
        Ok(df.collect().await?)
    }
}
