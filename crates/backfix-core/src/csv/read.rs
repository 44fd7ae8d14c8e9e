//! CSV ingestion.

use std::collections::HashMap;

use tracing::debug;

use crate::sanitize::{duration, value};
use crate::schema::TableProfile;
use crate::source::columns::{self, resolve};
use crate::types::{CleaningEntry, ConversionResult, Playlist, Song};

/// Tokenize one CSV line: comma separators, double-quote quoting, doubled
/// quotes for an embedded quote. Malformed quoting degrades gracefully
/// instead of failing the line.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => values.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
    }
    values.push(current);
    values
}

/// Fetch, sanitize, and report one cell of a data row.
fn clean_cell(
    cells: &[String],
    idx: Option<usize>,
    field: &'static str,
    report: &mut Vec<CleaningEntry>,
) -> String {
    match idx.and_then(|i| cells.get(i)) {
        Some(raw) => value::clean_text(raw, field, report),
        None => String::new(),
    }
}

fn duration_cell(cells: &[String], idx: Option<usize>, report: &mut Vec<CleaningEntry>) -> String {
    match idx.and_then(|i| cells.get(i)) {
        Some(raw) => duration::clean_text(raw, report),
        None => "0".to_string(),
    }
}

/// Parse CSV text into a [`ConversionResult`].
///
/// The header row is matched with the same column heuristics as database
/// extraction; playlists materialize on first sight of a playlist name,
/// numbered in order of appearance.
pub fn parse_csv(content: &str) -> ConversionResult {
    let mut result = ConversionResult::new();

    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        result.errors.push("Empty CSV file".to_string());
        return result;
    }

    let headers: Vec<String> = parse_line(lines[0])
        .iter()
        .map(|h| h.to_lowercase().trim().to_string())
        .collect();
    result.table_info.push(TableProfile::virtual_text(
        "CSV Import",
        &headers,
        (lines.len() - 1) as i64,
    ));

    let browse_idx = resolve(&headers, columns::csv::PLAYLIST_BROWSE_ID);
    let name_idx = resolve(&headers, columns::csv::PLAYLIST_NAME);
    let song_idx = resolve(&headers, columns::csv::SONG_ID);
    let title_idx = resolve(&headers, columns::csv::TITLE);
    let artists_idx = resolve(&headers, columns::csv::ARTISTS);
    let duration_idx = resolve(&headers, columns::csv::DURATION);
    let thumbnail_idx = resolve(&headers, columns::csv::THUMBNAIL);

    // playlist name -> index into result.playlists, insertion-ordered
    let mut playlist_slots: HashMap<String, usize> = HashMap::new();

    for (line_no, line) in lines.iter().enumerate().skip(1) {
        let cells = parse_line(line);
        let song = Song {
            song_id: clean_cell(&cells, song_idx, "songId", &mut result.cleaning_report),
            title: clean_cell(&cells, title_idx, "title", &mut result.cleaning_report),
            artists: clean_cell(&cells, artists_idx, "artists", &mut result.cleaning_report),
            duration: duration_cell(&cells, duration_idx, &mut result.cleaning_report),
            thumbnail_url: clean_cell(&cells, thumbnail_idx, "thumbnailUrl", &mut result.cleaning_report),
            liked_at: None,
            total_play_time_ms: 0,
        };
        if song.song_id.is_empty() {
            result
                .warnings
                .push(format!("Row {}: Missing song ID", line_no + 1));
            continue;
        }

        let playlist_name = clean_cell(&cells, name_idx, "playlistName", &mut result.cleaning_report);
        if playlist_name.is_empty() {
            result.songs.push(song);
            continue;
        }

        let member = song.clone();
        result.songs.push(song);
        let slot = match playlist_slots.get(&playlist_name) {
            Some(&slot) => slot,
            None => {
                let browse_id =
                    clean_cell(&cells, browse_idx, "browseId", &mut result.cleaning_report);
                result.playlists.push(Playlist {
                    id: result.playlists.len() as i64 + 1,
                    name: playlist_name.clone(),
                    browse_id,
                    songs: Vec::new(),
                    selected: true,
                });
                let slot = result.playlists.len() - 1;
                playlist_slots.insert(playlist_name, slot);
                slot
            }
        };
        result.playlists[slot].songs.push(member);
    }

    debug!(
        songs = result.songs.len(),
        playlists = result.playlists.len(),
        "parsed CSV import"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_plain() {
        assert_eq!(parse_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_line(""), vec![""]);
        assert_eq!(parse_line("a,,c"), vec!["a", "", "c"]);
        // trailing comma yields a trailing empty field
        assert_eq!(parse_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_parse_line_quoting() {
        assert_eq!(parse_line("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(parse_line("\"say \"\"hi\"\"\",x"), vec!["say \"hi\"", "x"]);
        assert_eq!(parse_line("plain,\"quoted\""), vec!["plain", "quoted"]);
    }

    #[test]
    fn test_parse_csv_builds_playlists_in_order() {
        let csv = "PlaylistBrowseId,PlaylistName,SongId,Title,Artists,Duration,ThumbnailUrl\n\
                   br1,Road Trip,s1,One,A,225,\n\
                   br1,Road Trip,s2,Two,B,180,\n\
                   br2,Chill,s3,Three,C,3:00,\n\
                   ,,s4,Loose,D,90,\n";
        let result = parse_csv(csv);

        assert!(result.errors.is_empty());
        assert_eq!(result.songs.len(), 4);
        assert_eq!(result.playlists.len(), 2);
        assert_eq!(result.playlists[0].name, "Road Trip");
        assert_eq!(result.playlists[0].id, 1);
        assert_eq!(result.playlists[0].browse_id, "br1");
        assert_eq!(result.playlists[0].songs.len(), 2);
        assert_eq!(result.playlists[1].name, "Chill");
        assert_eq!(result.playlists[1].id, 2);
        // "3:00" was repaired to canonical seconds
        assert_eq!(result.playlists[1].songs[0].duration, "180");
    }

    #[test]
    fn test_missing_song_id_warns_with_row_number() {
        let csv = "SongId,Title\n,No Id\ns2,Fine\n";
        let result = parse_csv(csv);

        assert_eq!(result.songs.len(), 1);
        assert_eq!(result.warnings, vec!["Row 2: Missing song ID"]);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        for content in ["", "\n\n", "   \n  \r\n"] {
            let result = parse_csv(content);
            assert_eq!(result.errors, vec!["Empty CSV file"], "for {content:?}");
        }
    }

    #[test]
    fn test_virtual_table_profile() {
        let csv = "SongId,Title\ns1,One\ns2,Two\n";
        let result = parse_csv(csv);

        assert_eq!(result.table_info.len(), 1);
        assert_eq!(result.table_info[0].name, "CSV Import");
        assert_eq!(result.table_info[0].row_count, 2);
        assert_eq!(result.table_info[0].columns.len(), 2);
        assert_eq!(result.table_info[0].columns[0].name, "songid");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let csv = "SongId,Title\r\n\r\ns1,One\r\n   \r\ns2,Two\r\n";
        let result = parse_csv(csv);
        assert_eq!(result.songs.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_csv_songs_have_no_history() {
        let csv = "SongId,Title\ns1,One\n";
        let result = parse_csv(csv);
        assert_eq!(result.songs[0].liked_at, None);
        assert_eq!(result.songs[0].total_play_time_ms, 0);
    }

    #[test]
    fn test_cells_are_sanitized() {
        let csv = "SongId,Title,PlaylistName\ns1,\"  Padded  \",Mix\n";
        let result = parse_csv(csv);

        assert_eq!(result.songs[0].title, "Padded");
        let entry = result
            .cleaning_report
            .iter()
            .find(|e| e.field == "title")
            .unwrap();
        assert_eq!(entry.issue, "whitespace trimmed");
        assert_eq!(result.playlists[0].songs[0].title, "Padded");
    }
}
