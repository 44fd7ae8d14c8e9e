//! Introspected snapshots of a source database's schema.
//!
//! The source schema is unknown ahead of time, so the engine records what
//! it actually found. Snapshots are display data for the caller; extraction
//! itself re-reads the tables.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// One column as reported by the source database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    /// Declared type, `UNKNOWN` when the source schema left it blank.
    #[serde(rename = "type")]
    pub sql_type: String,
    pub not_null: bool,
    /// 1-based position within the primary key, 0 when not part of it.
    pub primary_key: i64,
    pub default_value: Option<String>,
}

/// Snapshot of one source table: structure, size, and a small data sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProfile {
    pub name: String,
    pub columns: Vec<ColumnProfile>,
    pub row_count: i64,
    /// Up to a handful of rows, cell values rendered as JSON scalars.
    pub sample_rows: Vec<Vec<JsonValue>>,
}

impl TableProfile {
    /// Virtual profile for tabular text input that has no real schema.
    pub fn virtual_text(name: &str, headers: &[String], row_count: i64) -> Self {
        TableProfile {
            name: name.to_string(),
            columns: headers
                .iter()
                .map(|header| ColumnProfile {
                    name: header.clone(),
                    sql_type: "TEXT".to_string(),
                    not_null: false,
                    primary_key: 0,
                    default_value: None,
                })
                .collect(),
            row_count,
            sample_rows: Vec::new(),
        }
    }
}
