//! Canonical record types shared across the conversion pipeline.
//!
//! Extraction normalizes every source row into these structs; generation
//! reads them back out. Field names serialize in camelCase so the result
//! can be handed to a UI layer as JSON unchanged.

use serde::Serialize;

use crate::schema::{TableProfile, TargetSchemaInfo};

/// One repaired value, kept as a transparency record for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningEntry {
    /// Canonical field label, e.g. `title` or `mappingSongId`.
    pub field: &'static str,
    pub original: String,
    pub cleaned: String,
    /// Comma-joined list of the repairs applied.
    pub issue: String,
}

/// A track carried over from the source library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artists: String,
    /// Canonical duration in whole seconds, rendered as a decimal string.
    pub duration: String,
    pub thumbnail_url: String,
    /// Epoch millis of the like action; `None` when the song was never liked.
    pub liked_at: Option<i64>,
    pub total_play_time_ms: i64,
}

/// A playlist with its member songs resolved and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub browse_id: String,
    /// Member snapshots in playback order.
    pub songs: Vec<Song>,
    /// Export inclusion flag; callers may toggle it before generating.
    pub selected: bool,
}

/// An album record from the source library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub year: String,
    pub authors_text: String,
    pub share_url: String,
    pub timestamp: Option<i64>,
    pub bookmarked_at: Option<i64>,
}

/// An artist record from the source library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub thumbnail_url: String,
    pub timestamp: Option<i64>,
    pub bookmarked_at: Option<i64>,
}

/// Association between a song and an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAlbumMap {
    pub song_id: String,
    pub album_id: String,
    /// Track number within the album; `None` when the source had none.
    pub position: Option<i64>,
}

/// Association between a song and an artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongArtistMap {
    pub song_id: String,
    pub artist_id: String,
}

/// One playback event from the listening history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub song_id: String,
    pub timestamp: i64,
    pub play_time: i64,
}

/// Cached stream format metadata for a song.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    pub song_id: String,
    pub itag: Option<i64>,
    pub mime_type: String,
    pub bitrate: Option<i64>,
    pub content_length: Option<i64>,
    pub last_modified: Option<i64>,
    pub loudness_db: Option<f64>,
}

/// Stored lyrics for a song, plain and time-synced variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    pub song_id: String,
    pub fixed: String,
    pub synced: String,
}

/// A remembered search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
}

/// Fate of one source row after cleaning and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome<T> {
    /// Row survived and joins the result.
    Kept(T),
    /// Row was dropped without a trace, e.g. an association row whose
    /// foreign key points at a song the validity gate already excluded.
    DroppedSilently,
    /// Row was dropped and the reason joins the run's warnings.
    DroppedWithWarning(String),
}

/// Aggregate output of one conversion run.
///
/// Extraction is forgiving: problems are recorded in `errors` and
/// `warnings` while everything salvageable is still returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub songs: Vec<Song>,
    pub playlists: Vec<Playlist>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub song_album_maps: Vec<SongAlbumMap>,
    pub song_artist_maps: Vec<SongArtistMap>,
    pub events: Vec<Event>,
    pub formats: Vec<Format>,
    pub lyrics: Vec<Lyrics>,
    pub search_queries: Vec<SearchQuery>,
    /// Fatal problems, e.g. an unreadable source table.
    pub errors: Vec<String>,
    /// Dropped rows and other non-fatal findings.
    pub warnings: Vec<String>,
    /// Every value repair applied during extraction.
    pub cleaning_report: Vec<CleaningEntry>,
    /// Snapshot of the source schema, for display alongside the results.
    pub table_info: Vec<TableProfile>,
    /// Description of the fixed schema the generator will emit.
    #[serde(rename = "cubicMusicSchema")]
    pub target_schema: TargetSchemaInfo,
}

impl ConversionResult {
    /// Empty result carrying only the fixed target schema description.
    pub fn new() -> Self {
        ConversionResult {
            songs: Vec::new(),
            playlists: Vec::new(),
            albums: Vec::new(),
            artists: Vec::new(),
            song_album_maps: Vec::new(),
            song_artist_maps: Vec::new(),
            events: Vec::new(),
            formats: Vec::new(),
            lyrics: Vec::new(),
            search_queries: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            cleaning_report: Vec::new(),
            table_info: Vec::new(),
            target_schema: TargetSchemaInfo::current(),
        }
    }

    /// Playlists that an export should include.
    ///
    /// An explicit id list overrides the per-playlist `selected` flag.
    pub fn exported_playlists(&self, selected_ids: Option<&[i64]>) -> Vec<&Playlist> {
        match selected_ids {
            Some(ids) => self.playlists.iter().filter(|p| ids.contains(&p.id)).collect(),
            None => self.playlists.iter().filter(|p| p.selected).collect(),
        }
    }
}

impl Default for ConversionResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: i64, selected: bool) -> Playlist {
        Playlist {
            id,
            name: format!("Playlist {id}"),
            browse_id: String::new(),
            songs: Vec::new(),
            selected,
        }
    }

    #[test]
    fn test_exported_playlists_by_flag() {
        let mut result = ConversionResult::new();
        result.playlists = vec![playlist(1, true), playlist(2, false), playlist(3, true)];

        let exported = result.exported_playlists(None);
        let ids: Vec<i64> = exported.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_exported_playlists_by_explicit_ids() {
        let mut result = ConversionResult::new();
        result.playlists = vec![playlist(1, true), playlist(2, false), playlist(3, true)];

        // the id list wins over the selected flags, even when empty
        let exported = result.exported_playlists(Some(&[2]));
        let ids: Vec<i64> = exported.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2]);

        assert!(result.exported_playlists(Some(&[])).is_empty());
    }

    #[test]
    fn test_new_result_is_empty_but_describes_target() {
        let result = ConversionResult::new();
        assert!(result.songs.is_empty());
        assert!(result.errors.is_empty());
        assert!(!result.target_schema.tables.is_empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut result = ConversionResult::new();
        result.songs.push(Song {
            song_id: "s1".to_string(),
            total_play_time_ms: 42,
            ..Song::default()
        });

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("cleaningReport").is_some());
        assert!(json.get("cubicMusicSchema").is_some());
        assert_eq!(json["songs"][0]["songId"], "s1");
        assert_eq!(json["songs"][0]["totalPlayTimeMs"], 42);
    }
}
