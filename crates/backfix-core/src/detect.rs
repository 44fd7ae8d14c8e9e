//! Input format sniffing.
//!
//! Uploads arrive as raw bytes with no trustworthy file extension, so the
//! engine decides the container format from the content itself before any
//! parsing starts.

use serde::Serialize;

/// Byte signatures for supported input containers.
mod magic {
    /// SQLite database images begin with the ASCII bytes `SQLite`
    /// (the full header is `SQLite format 3\0`).
    pub const SQLITE: &[u8; 6] = b"SQLite";
}

/// How many leading bytes are probed when sniffing for CSV text.
const TEXT_PROBE_LEN: usize = 1000;

/// Container format of an uploaded backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Sqlite,
    Csv,
    Unknown,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Sqlite => "sqlite",
            SourceFormat::Csv => "csv",
            SourceFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sniff the container format from the first bytes of a buffer.
///
/// SQLite images are recognized by their magic signature. Anything else is
/// treated as CSV when the first kilobyte decodes to text containing at
/// least one comma and one line break; remaining inputs are rejected.
pub fn detect_format(buffer: &[u8]) -> SourceFormat {
    if buffer.len() >= magic::SQLITE.len() && &buffer[..magic::SQLITE.len()] == magic::SQLITE {
        return SourceFormat::Sqlite;
    }

    let probe = &buffer[..buffer.len().min(TEXT_PROBE_LEN)];
    let text = String::from_utf8_lossy(probe);
    if text.contains(',') && (text.contains('\n') || text.contains('\r')) {
        return SourceFormat::Csv;
    }

    SourceFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_sqlite_signature() {
        let header = b"SQLite format 3\0garbage after the header";
        assert_eq!(detect_format(header), SourceFormat::Sqlite);
    }

    #[test]
    fn test_detects_csv_text() {
        let csv = b"SongId,Title\ns1,First\n";
        assert_eq!(detect_format(csv), SourceFormat::Csv);
        // carriage returns count as line breaks too
        let csv = b"SongId,Title\rs1,First\r";
        assert_eq!(detect_format(csv), SourceFormat::Csv);
    }

    #[test]
    fn test_rejects_everything_else() {
        assert_eq!(detect_format(b""), SourceFormat::Unknown);
        assert_eq!(detect_format(b"SQLit"), SourceFormat::Unknown);
        // comma but no line break
        assert_eq!(detect_format(b"a,b,c"), SourceFormat::Unknown);
        // line break but no comma
        assert_eq!(detect_format(b"a\nb\nc"), SourceFormat::Unknown);
        assert_eq!(detect_format(&[0x00, 0x01, 0x02, 0x03]), SourceFormat::Unknown);
    }

    #[test]
    fn test_probe_window_is_bounded() {
        // the separators sit past the probe window, so they are not seen
        let mut buffer = vec![b'x'; 2000];
        buffer[1500] = b',';
        buffer[1501] = b'\n';
        assert_eq!(detect_format(&buffer), SourceFormat::Unknown);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(SourceFormat::Sqlite.to_string(), "sqlite");
        assert_eq!(SourceFormat::Csv.as_str(), "csv");
        assert_eq!(SourceFormat::Unknown.as_str(), "unknown");
    }
}
