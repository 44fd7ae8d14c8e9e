//! Duration canonicalization.
//!
//! Source backups disagree about durations: plain seconds, milliseconds,
//! or `mm:ss` display text, depending on the release that wrote them. The
//! canonical form is whole seconds rendered as a decimal string.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::types::Value;

use crate::sanitize::value::stringify;
use crate::types::CleaningEntry;

/// Numeric durations above this are assumed to be milliseconds. No track
/// runs 100,000 seconds (about 27 hours).
const MILLISECOND_THRESHOLD: f64 = 100_000.0;

static MINUTES_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{2})$").unwrap());

/// Convert a raw duration into whole seconds, plus the repair applied.
///
/// An empty string counts as zero without being flagged; anything that
/// fails every interpretation collapses to `"0"` with a repair note.
pub fn normalize(raw: &str) -> (String, Option<&'static str>) {
    let trimmed = raw.trim();

    let parsed = if trimmed.is_empty() {
        Some(0.0)
    } else {
        trimmed.parse::<f64>().ok()
    };
    if let Some(num) = parsed.filter(|n| n.is_finite() && *n >= 0.0) {
        if num > MILLISECOND_THRESHOLD {
            return (
                (num / 1000.0).floor().to_string(),
                Some("converted from milliseconds"),
            );
        }
        // negative zero passes the filter but must not render as "-0"
        let floored = num.floor() + 0.0;
        return (floored.to_string(), None);
    }

    if let Some(caps) = MINUTES_SECONDS.captures(trimmed) {
        let minutes: i64 = caps[1].parse().unwrap_or(0);
        let seconds: i64 = caps[2].parse().unwrap_or(0);
        return (
            (minutes * 60 + seconds).to_string(),
            Some("parsed from mm:ss format"),
        );
    }

    ("0".to_string(), Some("invalid duration set to 0"))
}

/// Normalize a raw duration string and record a report entry when a repair
/// actually changed the value.
pub fn clean_text(raw: &str, report: &mut Vec<CleaningEntry>) -> String {
    let trimmed = raw.trim();
    let (seconds, issue) = normalize(trimmed);
    if let Some(issue) = issue {
        if seconds != trimmed {
            report.push(CleaningEntry {
                field: "duration",
                original: trimmed.to_string(),
                cleaned: seconds.clone(),
                issue: issue.to_string(),
            });
        }
    }
    seconds
}

/// Normalize a database cell; NULL or a missing column yields `"0"` with no
/// report entry.
pub fn clean(value: Option<&Value>, report: &mut Vec<CleaningEntry>) -> String {
    match value.and_then(stringify) {
        Some(raw) => clean_text(&raw, report),
        None => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(raw: &str) -> String {
        normalize(raw).0
    }

    #[test]
    fn test_plain_seconds_pass_through() {
        assert_eq!(normalize("90"), ("90".to_string(), None));
        assert_eq!(normalize("0"), ("0".to_string(), None));
        // fractional seconds floor without being flagged
        assert_eq!(normalize("90.9"), ("90".to_string(), None));
    }

    #[test]
    fn test_milliseconds_convert() {
        assert_eq!(
            normalize("240000"),
            ("240".to_string(), Some("converted from milliseconds"))
        );
        // exactly at the threshold stays seconds
        assert_eq!(normalize("100000"), ("100000".to_string(), None));
    }

    #[test]
    fn test_mm_ss_parses() {
        assert_eq!(
            normalize("3:45"),
            ("225".to_string(), Some("parsed from mm:ss format"))
        );
        assert_eq!(seconds("0:07"), "7");
        assert_eq!(seconds("120:00"), "7200");
    }

    #[test]
    fn test_mm_ss_requires_two_second_digits() {
        // "3:4" and "3:456" do not match the display format
        assert_eq!(seconds("3:4"), "0");
        assert_eq!(seconds("3:456"), "0");
        assert_eq!(seconds("1:2:33"), "0");
    }

    #[test]
    fn test_invalid_collapses_to_zero() {
        assert_eq!(
            normalize("garbage"),
            ("0".to_string(), Some("invalid duration set to 0"))
        );
        assert_eq!(seconds("-5"), "0");
        assert_eq!(seconds("1,5"), "0");
    }

    #[test]
    fn test_empty_counts_as_zero_silently() {
        assert_eq!(normalize(""), ("0".to_string(), None));
        assert_eq!(normalize("   "), ("0".to_string(), None));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["90", "240000", "3:45", "garbage", ""] {
            let once = seconds(raw);
            assert_eq!(seconds(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_clean_reports_only_real_changes() {
        let mut report = Vec::new();

        assert_eq!(clean_text("3:45", &mut report), "225");
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].field, "duration");
        assert_eq!(report[0].original, "3:45");
        assert_eq!(report[0].cleaned, "225");
        assert_eq!(report[0].issue, "parsed from mm:ss format");

        // a plain number is accepted without noise
        assert_eq!(clean_text("180", &mut report), "180");
        assert_eq!(report.len(), 1);

        // an already-canonical zero stays silent
        assert_eq!(clean_text("0", &mut report), "0");
        assert_eq!(report.len(), 1);
        assert_eq!(clean_text("-0", &mut report), "0");
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_clean_handles_null_and_missing() {
        let mut report = Vec::new();
        assert_eq!(clean(Some(&Value::Null), &mut report), "0");
        assert_eq!(clean(None, &mut report), "0");
        assert!(report.is_empty());
    }

    #[test]
    fn test_clean_integer_and_real_cells() {
        let mut report = Vec::new();
        assert_eq!(clean(Some(&Value::Integer(225)), &mut report), "225");
        assert_eq!(clean(Some(&Value::Real(225.7)), &mut report), "225");
        assert!(report.is_empty());
    }
}
