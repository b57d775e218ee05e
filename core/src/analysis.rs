//! Unit analysis: catalog + aggregation + enrichment.
//!
//! A missing or unreadable catalog is not an error here. The analysis falls
//! back to an identifier-only top list and writes nothing. Aggregation and
//! report write failures are returned to the caller.

use std::path::{Path, PathBuf};

use crate::catalog::{UnitCatalog, load_catalog_or_empty};
use crate::config::DEFAULT_TOP_N;
use crate::error::Result;
use crate::query::analyze_units;
use crate::report::{Report, enrich, report_path_for, write_report_csv};

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Row bound for the identifier-only fallback
    pub top_n: usize,
    /// Report destination; defaults to [`report_path_for`] the dataset
    pub output: Option<PathBuf>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            output: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Report,
    /// Where the named report was written; None for the fallback
    pub written_to: Option<PathBuf>,
}

/// Analyze a Parquet dataset, attaching names from the catalog at `catalog_path`.
pub async fn analyze_with_names(
    parquet_path: &Path,
    catalog_path: &Path,
    options: &AnalysisOptions,
) -> Result<AnalysisOutcome> {
    let catalog = load_catalog_or_empty(catalog_path);
    analyze_with_catalog(parquet_path, &catalog, options).await
}

/// Analyze with an already loaded catalog.
pub async fn analyze_with_catalog(
    parquet_path: &Path,
    catalog: &UnitCatalog,
    options: &AnalysisOptions,
) -> Result<AnalysisOutcome> {
    if catalog.is_empty() {
        tracing::warn!("No unit names available, reporting by id only");
        let rows = analyze_units(parquet_path, Some(options.top_n)).await?;
        return Ok(AnalysisOutcome {
            report: Report::IdOnly(rows),
            written_to: None,
        });
    }

    let rows = analyze_units(parquet_path, None).await?;
    let named = enrich(&rows, catalog);

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| report_path_for(parquet_path));
    write_report_csv(&output, &named)?;

    Ok(AnalysisOutcome {
        report: Report::Named(named),
        written_to: Some(output),
    })
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    /// 25 units; unit `n` appears `n` times with `n % 3` kills per record.
    fn write_dataset(path: &Path) -> usize {
        let mut ids = Vec::new();
        let mut kills = Vec::new();
        let mut ratings = Vec::new();
        for unit in 1..=25i64 {
            for k in 0..unit {
                ids.push(unit);
                kills.push(unit % 3);
                ratings.push(1000.0 + (unit * 10 + k) as f64);
            }
        }
        let schema = Arc::new(Schema::new(vec![
            Field::new("unit_id", DataType::Int64, false),
            Field::new("killed_count", DataType::Int64, false),
            Field::new("player_rating", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(Int64Array::from(kills)),
                Arc::new(Float64Array::from(ratings)),
            ],
        )
        .unwrap();

        let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        batch.num_rows()
    }

    fn write_catalog(path: &Path) {
        fs::write(
            path,
            r#"{"scout": {"Id": 25, "HUDName": "Scout"}, "tank": {"Id": 24, "Name": "Tank"}}"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_named_report_is_full_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let parquet = dir.path().join("units.parquet");
        let catalog = dir.path().join("units.json");
        let records = write_dataset(&parquet);
        write_catalog(&catalog);

        let outcome = analyze_with_names(&parquet, &catalog, &AnalysisOptions::default())
            .await
            .unwrap();

        let Report::Named(rows) = &outcome.report else {
            panic!("expected named report");
        };
        assert_eq!(rows.len(), 25);
        assert_eq!(rows[0].unit_name, "Scout");
        assert_eq!(rows[1].unit_name, "Tank");
        assert_eq!(rows[2].unit_name, "Unknown Unit 23");
        assert_eq!(rows.iter().map(|r| r.count).sum::<i64>(), records as i64);
        assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));

        let written = outcome.written_to.unwrap();
        assert_eq!(written, dir.path().join("units_analysis_with_names.csv"));
        let contents = fs::read_to_string(&written).unwrap();
        // Header plus one line per unit
        assert_eq!(contents.lines().count(), 26);
        assert!(contents.starts_with("unit_name,unit_id,count,"));
    }

    #[tokio::test]
    async fn test_missing_catalog_falls_back_to_ids() {
        let dir = tempfile::tempdir().unwrap();
        let parquet = dir.path().join("units.parquet");
        let catalog = dir.path().join("units.json");
        write_dataset(&parquet);
        write_catalog(&catalog);

        let named = analyze_with_names(&parquet, &catalog, &AnalysisOptions::default())
            .await
            .unwrap();
        let fallback = analyze_with_names(
            &parquet,
            &dir.path().join("missing.json"),
            &AnalysisOptions::default(),
        )
        .await
        .unwrap();

        assert!(!fallback.report.has_names());
        assert!(fallback.written_to.is_none());
        assert_eq!(fallback.report.len(), 20);
        // Same numbers as the named run, just fewer rows and no names
        let named_top: Vec<_> = named.report.aggregates().into_iter().take(20).collect();
        assert_eq!(fallback.report.aggregates(), named_top);
    }

    #[tokio::test]
    async fn test_malformed_catalog_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let parquet = dir.path().join("units.parquet");
        let catalog = dir.path().join("units.json");
        write_dataset(&parquet);
        fs::write(&catalog, "[{\"Id\": 1,").unwrap();

        let options = AnalysisOptions {
            top_n: 5,
            output: None,
        };
        let outcome = analyze_with_names(&parquet, &catalog, &options).await.unwrap();
        assert!(matches!(outcome.report, Report::IdOnly(ref rows) if rows.len() == 5));
        assert!(!dir.path().join("units_analysis_with_names.csv").exists());
    }

    #[tokio::test]
    async fn test_output_override() {
        let dir = tempfile::tempdir().unwrap();
        let parquet = dir.path().join("units.parquet");
        let catalog = dir.path().join("units.json");
        write_dataset(&parquet);
        write_catalog(&catalog);

        let output = dir.path().join("custom.csv");
        let options = AnalysisOptions {
            top_n: 20,
            output: Some(output.clone()),
        };
        let outcome = analyze_with_names(&parquet, &catalog, &options).await.unwrap();
        assert_eq!(outcome.written_to, Some(output.clone()));
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_missing_dataset_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("units.json");
        write_catalog(&catalog);

        let result = analyze_with_names(
            &dir.path().join("missing.parquet"),
            &catalog,
            &AnalysisOptions::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
