pub mod analysis;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod query;
pub mod report;

// Re-exports for convenience
pub use analysis::{AnalysisOptions, AnalysisOutcome, analyze_with_catalog, analyze_with_names};
pub use catalog::{CatalogLoad, UnitCatalog, load_catalog, load_catalog_or_empty, placeholder_name};
pub use config::SkirmishConfig;
pub use convert::{ConversionReport, convert_csv_to_parquet, parquet_path_for};
pub use error::AnalysisError;
pub use query::{UnitQuery, analyze_units};
pub use report::{Report, enrich, report_path_for, write_report_csv};
pub use skirmish_types::{AggregateRow, ReportRow};
