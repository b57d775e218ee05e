//! CSV → Parquet conversion.
//!
//! The CSV is read through DataFusion (header row, inferred column types) and
//! streamed batch by batch into a Snappy-compressed Parquet file. Output goes
//! to a sibling `.parquet.tmp` file that is renamed into place only once the
//! writer has closed cleanly, so a failed run never leaves a truncated file
//! under the final name.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use datafusion::prelude::*;
use futures_util::StreamExt;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{AnalysisError, Result};

pub const PARQUET_EXTENSION: &str = "parquet";

/// Outcome of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub rows: usize,
    pub elapsed: Duration,
}

impl ConversionReport {
    /// Fraction of space saved: `1 - output / input`. Zero for an empty input.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        1.0 - self.output_bytes as f64 / self.input_bytes as f64
    }
}

/// Parquet path for a CSV export: same stem, `.parquet` extension.
pub fn parquet_path_for(csv_path: &Path) -> PathBuf {
    csv_path.with_extension(PARQUET_EXTENSION)
}

fn temp_path_for(output_path: &Path) -> PathBuf {
    let mut name = output_path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Convert a CSV file to Parquet beside it.
///
/// The whole schema and row set is carried over; types come from DataFusion's
/// CSV inference.
pub async fn convert_csv_to_parquet(csv_path: &Path) -> Result<ConversionReport> {
    let input_bytes = fs::metadata(csv_path)
        .map_err(|e| AnalysisError::io(csv_path, e))?
        .len();

    let output_path = parquet_path_for(csv_path);
    if output_path == csv_path {
        return Err(AnalysisError::io(
            csv_path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "input already has the parquet extension",
            ),
        ));
    }

    tracing::info!(
        input = %csv_path.display(),
        output = %output_path.display(),
        input_bytes,
        "Starting CSV to Parquet conversion"
    );

    let timer = Instant::now();
    let tmp_path = temp_path_for(&output_path);

    let rows = match write_parquet(csv_path, &tmp_path).await {
        Ok(rows) => rows,
        Err(e) => {
            // Ignore cleanup failure; the original error is what matters
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    fs::rename(&tmp_path, &output_path).map_err(|e| AnalysisError::io(&output_path, e))?;

    let elapsed = timer.elapsed();
    let output_bytes = fs::metadata(&output_path)
        .map_err(|e| AnalysisError::io(&output_path, e))?
        .len();

    let report = ConversionReport {
        input_path: csv_path.to_path_buf(),
        output_path,
        input_bytes,
        output_bytes,
        rows,
        elapsed,
    };

    tracing::info!(
        rows,
        output_bytes,
        elapsed_ms = elapsed.as_millis() as u64,
        ratio = report.compression_ratio(),
        "Conversion finished"
    );

    Ok(report)
}

/// Stream the CSV through DataFusion into a Parquet file. Returns rows written.
async fn write_parquet(csv_path: &Path, out_path: &Path) -> Result<usize> {
    let ctx = SessionContext::new();

    // DataFusion filters listed files by extension, so match the input's own
    let extension = csv_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let options = CsvReadOptions::new()
        .has_header(true)
        .file_extension(&extension);

    let df = ctx
        .read_csv(csv_path.to_string_lossy().to_string(), options)
        .await?;
    let mut stream = df.execute_stream().await?;

    let file = File::create(out_path).map_err(|e| AnalysisError::io(out_path, e))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, stream.schema(), Some(props))?;

    let mut rows = 0;
    while let Some(batch) = stream.next().await {
        let batch = batch?;
        rows += batch.num_rows();
        writer.write(&batch)?;
    }
    writer.close()?;

    Ok(rows)
}
