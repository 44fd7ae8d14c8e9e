//! CSV ingestion and export.
//!
//! The textual sibling of the SQLite path: one row per song with optional
//! playlist columns, quoted per RFC 4180 conventions.

pub mod read;
pub mod write;

pub use read::parse_line;
pub use write::EXPORT_HEADER;
