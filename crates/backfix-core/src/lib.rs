//! Backfix Core - Headless conversion engine for Kreate music backups.
//!
//! Kreate backups are SQLite images whose schema drifted across releases;
//! Cubic Music refuses anything but its fixed Room schema at version 23.
//! This crate opens an untrusted backup (SQLite or CSV), locates the
//! conceptual tables by name heuristics, repairs field values while
//! reporting every change, relinks the song/playlist graph, and emits a
//! byte-compatible replacement image or a CSV export.
//!
//! # Example
//!
//! ```rust,ignore
//! use backfix_core::Converter;
//!
//! fn main() -> backfix_core::Result<()> {
//!     let converter = Converter::new()?;
//!     let result = converter.parse(&std::fs::read("backup.sqlite")?)?;
//!
//!     println!(
//!         "{} songs, {} playlists, {} repairs",
//!         result.songs.len(),
//!         result.playlists.len(),
//!         result.cleaning_report.len()
//!     );
//!
//!     let image = converter.generate_sqlite(&result, None)?;
//!     std::fs::write("cubic_music_backup.sqlite", image)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod csv;
pub mod detect;
pub mod error;
pub mod sanitize;
pub mod schema;
pub mod source;
pub mod types;

mod convert;
mod generate;

// Re-export commonly used types
pub use detect::{detect_format, SourceFormat};
pub use error::{ConvertError, Result};
pub use schema::{ColumnProfile, TableProfile, TargetSchema, TargetSchemaInfo, TARGET_SCHEMA};
pub use types::{
    Album, Artist, CleaningEntry, ConversionResult, Event, Format, Lyrics, Playlist, RowOutcome,
    SearchQuery, Song, SongAlbumMap, SongArtistMap,
};

use std::io::Write;
use std::sync::OnceLock;

use tempfile::TempDir;
use tracing::debug;

use crate::config::AppConfig;

/// Output container for [`export_file_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sqlite,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Sqlite => "sqlite",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Conversion engine handle.
///
/// Owns a scratch directory where uploaded bytes and generated images are
/// materialized for SQLite to work on; everything in it is deleted when the
/// handle drops. Parsing and generation are pure functions of their inputs
/// otherwise, so one handle is safely shared across threads.
pub struct Converter {
    scratch: TempDir,
}

static SHARED: OnceLock<Converter> = OnceLock::new();

impl Converter {
    /// Create an engine with its own scratch directory.
    pub fn new() -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("backfix-")
            .tempdir()
            .map_err(ConvertError::from)?;
        debug!(scratch = %scratch.path().display(), "created converter");
        Ok(Converter { scratch })
    }

    /// Process-wide engine, created on first use.
    pub fn shared() -> Result<&'static Converter> {
        if let Some(converter) = SHARED.get() {
            return Ok(converter);
        }
        // construction is fallible, so initialize outside get_or_init and
        // let a losing racer's scratch dir drop
        let converter = Converter::new()?;
        Ok(SHARED.get_or_init(|| converter))
    }

    /// Parse any supported input, routing by detected format.
    pub fn parse(&self, buffer: &[u8]) -> Result<ConversionResult> {
        match detect_format(buffer) {
            SourceFormat::Sqlite => self.parse_sqlite(buffer),
            SourceFormat::Csv => Ok(self.parse_csv(&String::from_utf8_lossy(buffer))),
            SourceFormat::Unknown => Err(ConvertError::UnsupportedFormat {
                message: "input is neither a SQLite image nor CSV text".to_string(),
            }),
        }
    }

    /// Parse a SQLite backup image.
    pub fn parse_sqlite(&self, buffer: &[u8]) -> Result<ConversionResult> {
        let mut scratch_file = tempfile::Builder::new()
            .prefix("source-")
            .suffix(".sqlite")
            .tempfile_in(self.scratch.path())
            .map_err(|e| ConvertError::io_with_path(e, self.scratch.path()))?;
        scratch_file.write_all(buffer)?;
        scratch_file.flush()?;
        convert::parse_sqlite_file(scratch_file.path())
    }

    /// Parse a CSV export. Always yields a result; problems are recorded in
    /// its `errors` and `warnings`.
    pub fn parse_csv(&self, content: &str) -> ConversionResult {
        csv::read::parse_csv(content)
    }

    /// Generate the target database image.
    ///
    /// `selected_ids` narrows the exported playlists; `None` defers to each
    /// playlist's `selected` flag.
    pub fn generate_sqlite(
        &self,
        result: &ConversionResult,
        selected_ids: Option<&[i64]>,
    ) -> Result<Vec<u8>> {
        let scratch_file = tempfile::Builder::new()
            .prefix("target-")
            .suffix(".sqlite")
            .tempfile_in(self.scratch.path())
            .map_err(|e| ConvertError::io_with_path(e, self.scratch.path()))?;
        generate::generate_sqlite_file(result, selected_ids, scratch_file.path())?;
        std::fs::read(scratch_file.path())
            .map_err(|e| ConvertError::io_with_path(e, scratch_file.path()))
    }

    /// Generate a CSV export with the same playlist selection semantics as
    /// [`Converter::generate_sqlite`].
    pub fn generate_csv(&self, result: &ConversionResult, selected_ids: Option<&[i64]>) -> String {
        csv::write::generate_csv(result, selected_ids)
    }
}

/// Suggested download filename for an exported backup: the original name
/// minus its last extension, prefixed for the target app.
pub fn export_file_name(original_name: &str, format: OutputFormat) -> String {
    let stem = match original_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => original_name,
    };
    format!(
        "{}_{}.{}",
        AppConfig::EXPORT_FILE_PREFIX,
        stem,
        format.extension()
    )
}
