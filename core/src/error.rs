//! Error type shared by every pipeline step.
//!
//! Each component returns `Result<_, AnalysisError>`; whether a failure means
//! "fall back" or "abort this step" is decided by the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected catalog root in {}: expected array or object, found {found}", path.display())]
    Format { path: PathBuf, found: &'static str },

    #[error("query failed: {0}")]
    Query(String),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the missing-file case, which callers treat as recoverable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<datafusion::error::DataFusionError> for AnalysisError {
    fn from(e: datafusion::error::DataFusionError) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<parquet::errors::ParquetError> for AnalysisError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for AnalysisError {
    fn from(e: arrow::error::ArrowError) -> Self {
        Self::Query(e.to_string())
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
