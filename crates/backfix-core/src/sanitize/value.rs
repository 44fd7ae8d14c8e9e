//! Scalar value cleaning.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::types::Value;

use crate::types::CleaningEntry;

/// Report values longer than this are truncated with an ellipsis marker.
const MAX_REPORT_LEN: usize = 100;

static CONTROL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").unwrap());

/// Outcome of sanitizing one raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub text: String,
    /// Repairs applied, in application order.
    pub issues: Vec<&'static str>,
}

impl Sanitized {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Normalize one raw string, tagging every repair applied.
///
/// Steps run in a fixed order: strip control characters, trim surrounding
/// whitespace, un-escape `\"` and `\'` sequences left over from earlier
/// export tooling.
pub fn sanitize(raw: &str) -> Sanitized {
    let mut text = raw.to_string();
    let mut issues = Vec::new();

    if CONTROL_CHARS.is_match(&text) {
        text = CONTROL_CHARS.replace_all(&text, "").into_owned();
        issues.push("control characters removed");
    }

    if text.trim() != text {
        text = text.trim().to_string();
        issues.push("whitespace trimmed");
    }

    if text.contains("\\\"") || text.contains("\\'") {
        text = text.replace("\\\"", "\"").replace("\\'", "'");
        issues.push("escaped quotes fixed");
    }

    Sanitized { text, issues }
}

/// Render a raw SQLite value the way the cleaning pipeline sees it.
///
/// NULL maps to `None`; blobs decode as lossy UTF-8 so the control
/// character strip deals with any binary residue.
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Sanitize a raw string and record a report entry when it was altered.
pub fn clean_text(raw: &str, field: &'static str, report: &mut Vec<CleaningEntry>) -> String {
    let outcome = sanitize(raw);
    if !outcome.issues.is_empty() && outcome.text != raw {
        report.push(CleaningEntry {
            field,
            original: clip(raw),
            cleaned: clip(&outcome.text),
            issue: outcome.issues.join(", "),
        });
    }
    outcome.text
}

/// Sanitize a database cell; NULL or a missing column yields an empty string
/// with no report entry.
pub fn clean(value: Option<&Value>, field: &'static str, report: &mut Vec<CleaningEntry>) -> String {
    match value.and_then(stringify) {
        Some(raw) => clean_text(&raw, field, report),
        None => String::new(),
    }
}

/// Truncate a report value to a displayable length, on a char boundary.
fn clip(value: &str) -> String {
    if value.chars().count() > MAX_REPORT_LEN {
        let head: String = value.chars().take(MAX_REPORT_LEN).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}
