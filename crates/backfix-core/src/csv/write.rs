//! CSV export.

use std::collections::HashSet;

use tracing::debug;

use crate::types::{ConversionResult, Song};

/// Fixed header of the textual export format. The import path recognizes
/// every one of these names.
pub const EXPORT_HEADER: [&str; 7] = [
    "PlaylistBrowseId",
    "PlaylistName",
    "SongId",
    "Title",
    "Artists",
    "Duration",
    "ThumbnailUrl",
];

/// Quote a cell when it contains a separator, quote, or line break.
fn escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn row(browse_id: &str, playlist_name: &str, song: &Song) -> String {
    [
        browse_id,
        playlist_name,
        &song.song_id,
        &song.title,
        &song.artists,
        &song.duration,
        &song.thumbnail_url,
    ]
    .iter()
    .map(|cell| escape(cell))
    .collect::<Vec<String>>()
    .join(",")
}

/// Render the library as CSV text.
///
/// One row per playlist membership first, then every song that appeared in
/// no exported playlist once, with empty playlist cells. Durations are the
/// canonical whole-second strings.
pub fn generate_csv(result: &ConversionResult, selected_ids: Option<&[i64]>) -> String {
    let mut lines = vec![EXPORT_HEADER.join(",")];
    let mut exported: HashSet<&str> = HashSet::new();

    for playlist in result.exported_playlists(selected_ids) {
        for song in &playlist.songs {
            lines.push(row(&playlist.browse_id, &playlist.name, song));
            exported.insert(song.song_id.as_str());
        }
    }

    for song in &result.songs {
        if exported.insert(song.song_id.as_str()) {
            lines.push(row("", "", song));
        }
    }

    debug!(rows = lines.len() - 1, "generated CSV export");
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Playlist;

    fn song(id: &str, title: &str) -> Song {
        Song {
            song_id: id.to_string(),
            title: title.to_string(),
            artists: "Some Artist".to_string(),
            duration: "225".to_string(),
            ..Song::default()
        }
    }

    #[test]
    fn test_escape_rules() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_export_shape() {
        let mut result = ConversionResult::new();
        result.songs = vec![song("s1", "One"), song("s2", "Two"), song("s3", "Loose")];
        result.playlists = vec![Playlist {
            id: 1,
            name: "Mix".to_string(),
            browse_id: "br1".to_string(),
            songs: vec![song("s1", "One"), song("s2", "Two")],
            selected: true,
        }];

        let csv = generate_csv(&result, None);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "PlaylistBrowseId,PlaylistName,SongId,Title,Artists,Duration,ThumbnailUrl"
        );
        assert_eq!(lines[1], "br1,Mix,s1,One,Some Artist,225,");
        assert_eq!(lines[2], "br1,Mix,s2,Two,Some Artist,225,");
        // the unplaylisted song trails with empty playlist cells
        assert_eq!(lines[3], ",,s3,Loose,Some Artist,225,");
        assert_eq!(lines.len(), 4);
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_deselected_playlists_fall_back_to_loose_songs() {
        let mut result = ConversionResult::new();
        result.songs = vec![song("s1", "One")];
        result.playlists = vec![Playlist {
            id: 1,
            name: "Hidden".to_string(),
            browse_id: String::new(),
            songs: vec![song("s1", "One")],
            selected: false,
        }];

        let csv = generate_csv(&result, None);
        let lines: Vec<&str> = csv.lines().collect();
        // the playlist was not exported, so its song surfaces as loose
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(",,s1,"));
    }

    #[test]
    fn test_cells_with_commas_round_trip() {
        let mut result = ConversionResult::new();
        let mut tricky = song("s1", "Pause, Rewind");
        tricky.artists = "Duo \"Live\"".to_string();
        result.songs = vec![tricky];

        let csv = generate_csv(&result, None);
        let reparsed = crate::csv::read::parse_csv(&csv);

        assert_eq!(reparsed.songs.len(), 1);
        assert_eq!(reparsed.songs[0].title, "Pause, Rewind");
        assert_eq!(reparsed.songs[0].artists, "Duo \"Live\"");
        assert!(reparsed.warnings.is_empty());
    }
}
