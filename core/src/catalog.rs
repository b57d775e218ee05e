//! Unit catalog loading
//!
//! The catalog is a JSON document describing known units. Its root is either
//! an array of entries or an object whose values are entries:
//!
//! ```json
//! [{ "Id": 7, "HUDName": "Scout", "Name": "recon_scout" }]
//! { "recon_scout": { "Id": 7, "HUDName": "Scout" } }
//! ```
//!
//! Loading is permissive: entries that can't be used are skipped one by one
//! and reported as [`SkipReason`]s, never failing the whole load.
//!
//! The display name is `HUDName`, else `Name`, else [`placeholder_name`]. A
//! name field that is present but blank or not a string is treated as absent,
//! so `{"HUDName": "", "Name": "recon_scout"}` resolves to `recon_scout` rather
//! than an empty name.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{AnalysisError, Result};

/// Display name for an id with no usable catalog name.
///
/// Shared by the catalog fallback and the report join so both paths produce
/// identical text.
pub fn placeholder_name(id: impl fmt::Display) -> String {
    format!("Unknown Unit {id}")
}

/// Catalog document root, resolved once before walking entries.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRoot {
    Sequence(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl CatalogRoot {
    /// Classify a parsed document. Returns the JSON type name on mismatch.
    pub fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Array(items) => Ok(Self::Sequence(items)),
            Value::Object(map) => Ok(Self::Keyed(map)),
            other => Err(json_type_name(&other)),
        }
    }

    /// Flatten into entries in source order.
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Sequence(items) => items,
            Self::Keyed(map) => map.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

/// A catalog entry with a resolved display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: u64,
    pub display_name: String,
}

/// Why an entry was left out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry is not a JSON object
    NotAnObject { index: usize, found: &'static str },
    /// `Id` absent or null
    MissingId { index: usize },
    /// `Id` present but not a non-negative integer
    InvalidId { index: usize, raw: String },
}

impl SkipReason {
    /// Missing ids are routine in exported catalogs and are skipped quietly.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::MissingId { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { index, found } => {
                write!(f, "entry {index}: expected object, found {found}")
            }
            Self::MissingId { index } => write!(f, "entry {index}: no Id"),
            Self::InvalidId { index, raw } => write!(f, "entry {index}: invalid Id {raw}"),
        }
    }
}

/// Parse one entry. `index` is the entry's position in the source document.
pub fn parse_entry(index: usize, value: &Value) -> Result<CatalogEntry, SkipReason> {
    let Value::Object(fields) = value else {
        return Err(SkipReason::NotAnObject {
            index,
            found: json_type_name(value),
        });
    };

    let id = match fields.get("Id") {
        None | Some(Value::Null) => return Err(SkipReason::MissingId { index }),
        Some(raw) => parse_id(raw).ok_or_else(|| SkipReason::InvalidId {
            index,
            raw: raw.to_string(),
        })?,
    };

    let display_name = name_field(fields, "HUDName")
        .or_else(|| name_field(fields, "Name"))
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_name(id));

    Ok(CatalogEntry { id, display_name })
}

/// Lazily parse every entry, yielding either the entry or the reason it was skipped.
pub fn parse_entries(
    entries: impl IntoIterator<Item = Value>,
) -> impl Iterator<Item = Result<CatalogEntry, SkipReason>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_entry(index, &value))
}

/// Accepts integers and integral floats (`7.0`), rejects negatives and fractions.
fn parse_id(raw: &Value) -> Option<u64> {
    let Value::Number(n) = raw else {
        return None;
    };
    if let Some(id) = n.as_u64() {
        return Some(id);
    }
    let f = n.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// A non-empty string field, or None.
fn name_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable id → display name lookup.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    names: HashMap<u64, String>,
    /// First-seen order of ids, for previews
    order: Vec<u64>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Later entries with the same id replace the name but
    /// keep the original position.
    pub fn insert(&mut self, entry: CatalogEntry) {
        if self.names.insert(entry.id, entry.display_name).is_none() {
            self.order.push(entry.id);
        }
    }

    /// Look up a unit id as stored in the battle data.
    pub fn name_for(&self, unit_id: i64) -> Option<&str> {
        let id = u64::try_from(unit_id).ok()?;
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.order
            .iter()
            .filter_map(|id| self.names.get(id).map(|name| (*id, name.as_str())))
    }

    /// First `n` entries in source order.
    pub fn preview(&self, n: usize) -> Vec<(u64, &str)> {
        self.iter().take(n).collect()
    }
}

impl FromIterator<CatalogEntry> for UnitCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for entry in iter {
            catalog.insert(entry);
        }
        catalog
    }
}

/// Result of a catalog load: the usable entries plus everything skipped.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: UnitCatalog,
    pub skipped: Vec<SkipReason>,
}

impl CatalogLoad {
    /// Fold parsed entries into a catalog, keeping skip reasons separately.
    pub fn from_results(results: impl IntoIterator<Item = Result<CatalogEntry, SkipReason>>) -> Self {
        let mut load = Self::default();
        for result in results {
            match result {
                Ok(entry) => load.catalog.insert(entry),
                Err(reason) => load.skipped.push(reason),
            }
        }
        load
    }
}

/// Parse a catalog from JSON text. `path` is only used in error messages.
pub fn parse_catalog(path: &Path, contents: &str) -> Result<CatalogLoad> {
    let value: Value = serde_json::from_str(contents).map_err(|source| AnalysisError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let root = CatalogRoot::from_value(value).map_err(|found| AnalysisError::Format {
        path: path.to_path_buf(),
        found,
    })?;

    Ok(CatalogLoad::from_results(parse_entries(root.into_entries())))
}

/// Load a catalog file, logging each skipped entry.
pub fn load_catalog(path: &Path) -> Result<CatalogLoad> {
    let contents = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    let load = parse_catalog(path, &contents)?;

    for reason in load.skipped.iter().filter(|r| !r.is_silent()) {
        tracing::warn!(path = %path.display(), %reason, "Skipped catalog entry");
    }
    tracing::info!(
        path = %path.display(),
        units = load.catalog.len(),
        skipped = load.skipped.len(),
        "Loaded unit catalog"
    );

    Ok(load)
}

/// Load a catalog, treating any failure as an empty catalog.
///
/// Callers switch to the identifier-only report when this comes back empty.
pub fn load_catalog_or_empty(path: &Path) -> UnitCatalog {
    match load_catalog(path) {
        Ok(load) => load.catalog,
        Err(e) if e.is_not_found() => {
            tracing::warn!(path = %path.display(), "Catalog file not found");
            UnitCatalog::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load catalog");
            UnitCatalog::new()
        }
    }
}
