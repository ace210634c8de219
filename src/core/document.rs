//! On-disk JSON documents
//!
//! Two documents are persisted: the product catalog (both families together)
//! and a quotation. Both are written whole, pretty-printed, UTF-8 unescaped,
//! and tagged with [`FORMAT_VERSION`].

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::catalog::CatalogEntry;
use crate::core::ledger::LineItem;

/// Format version written into every document
pub const FORMAT_VERSION: &str = "1.0";

/// Top-level fields an imported catalog document must carry
pub const CATALOG_REQUIRED_FIELDS: [&str; 4] =
    ["sphereTypes", "sphereModels", "flangeTypes", "flangeModels"];

/// Top-level field a quotation document must carry
pub const QUOTATION_REQUIRED_FIELD: &str = "quotationItems";

/// Errors raised while reading or writing documents
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage location unavailable")]
    StorageUnavailable,

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is missing required field '{field}'", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

/// Serialized form of the product catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub sphere_types: Vec<String>,

    #[serde(default)]
    pub sphere_models: BTreeMap<String, Vec<CatalogEntry>>,

    #[serde(default)]
    pub flange_types: Vec<String>,

    #[serde(default)]
    pub flange_models: BTreeMap<String, Vec<CatalogEntry>>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub export_date: Option<DateTime<FixedOffset>>,

    #[serde(default = "default_version")]
    pub version: String,
}

/// Serialized form of a quotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDocument {
    pub quotation_items: Vec<LineItem>,

    #[serde(default)]
    pub total_price: f64,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub save_date: Option<DateTime<FixedOffset>>,

    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

/// Current local time, as stamped into written documents
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Parse an ISO-8601 timestamp, with or without a UTC offset.
///
/// Offset-less timestamps (`2024-05-01T10:20:30.123456`) are read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|dt| dt.fixed_offset())
}

/// A malformed timestamp is dropped rather than failing the whole document
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_timestamp))
}

/// Read a file into a generic JSON value
pub fn read_value(path: &Path) -> Result<serde_json::Value, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert a JSON value into a typed document
pub fn from_value<T: DeserializeOwned>(
    path: &Path,
    value: serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Check that every name in `fields` is a top-level key of `value`
pub fn require_fields(
    path: &Path,
    value: &serde_json::Value,
    fields: &[&'static str],
) -> Result<(), StoreError> {
    for &field in fields {
        if value.get(field).is_none() {
            return Err(StoreError::MissingField {
                path: path.to_path_buf(),
                field,
            });
        }
    }
    Ok(())
}

/// Write a document, creating the containing directory if needed
pub fn write_json<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(document).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
