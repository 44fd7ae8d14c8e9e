//! Read-side adapter over an untrusted source database.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::Result;
use crate::schema::{ColumnProfile, TableProfile};

/// Sample rows captured per table for the schema snapshot.
const SAMPLE_ROW_LIMIT: usize = 3;

/// A source backup opened read-only for introspection and extraction.
///
/// The handle is exclusively owned by one conversion run and releases the
/// underlying file when dropped.
pub struct SourceDatabase {
    conn: Connection,
}

/// All rows of one table, read eagerly with original column casing.
///
/// Rows are kept as per-row results so one undecodable row does not take
/// the rest of the table down with it.
pub struct SourceTable {
    pub columns: Vec<String>,
    pub rows: Vec<rusqlite::Result<Vec<Value>>>,
}

impl SourceDatabase {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(SourceDatabase { conn })
    }

    /// Names of all user tables, in `sqlite_master` order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        debug!(tables = names.len(), "listed source tables");
        Ok(names)
    }

    /// Snapshot one table: column metadata, row count, and a few sample rows.
    pub fn profile(&self, table: &str) -> Result<TableProfile> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| {
                let sql_type: String = row.get(2)?;
                Ok(ColumnProfile {
                    name: row.get(1)?,
                    sql_type: if sql_type.is_empty() {
                        "UNKNOWN".to_string()
                    } else {
                        sql_type
                    },
                    not_null: row.get::<_, i64>(3)? != 0,
                    primary_key: row.get(5)?,
                    default_value: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<ColumnProfile>>>()?;

        let row_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |row| row.get(0),
        )?;

        Ok(TableProfile {
            name: table.to_string(),
            columns,
            row_count,
            sample_rows: self.sample_rows(table)?,
        })
    }

    fn sample_rows(&self, table: &str) -> Result<Vec<Vec<serde_json::Value>>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {} LIMIT {}",
            quote_ident(table),
            SAMPLE_ROW_LIMIT
        ))?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get::<_, Value>(i).map(json_cell))
                    .collect::<rusqlite::Result<Vec<serde_json::Value>>>()
            })?
            .collect::<rusqlite::Result<Vec<Vec<serde_json::Value>>>>()?;
        Ok(rows)
    }

    /// Read a whole table into memory.
    pub fn read_table(&self, table: &str) -> Result<SourceTable> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<Value>>>()
            })?
            .collect();
        Ok(SourceTable { columns, rows })
    }
}

/// Double-quote an identifier so heuristically located table names can be
/// interpolated into SQL safely.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a sample cell as a JSON scalar; blobs show only their size.
fn json_cell(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(i),
        Value::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s),
        Value::Blob(b) => serde_json::Value::String(format!("blob({} bytes)", b.len())),
    }
}
