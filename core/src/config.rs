//! Persisted defaults for input paths and summary size.
//!
//! Stored by `confy` as TOML in the platform config directory under the
//! `skirmish` app name. Command-line arguments override every field.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "skirmish";

/// Rows shown in summaries and kept by the ID-only fallback
pub const DEFAULT_TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    /// Battle export used by `convert` and `run` when no path is given
    pub battles_csv: Option<PathBuf>,
    /// Unit catalog used by `analyze` when `--catalog` is omitted
    pub catalog_json: Option<PathBuf>,
    pub top_n: usize,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            battles_csv: None,
            catalog_json: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SkirmishConfig {
    /// Load the stored config, falling back to defaults if it can't be read.
    pub fn load() -> Self {
        match confy::load::<SkirmishConfig>(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Parquet path matching the configured battle export, if any.
    pub fn battles_parquet(&self) -> Option<PathBuf> {
        self.battles_csv.as_deref().map(crate::convert::parquet_path_for)
    }
}
