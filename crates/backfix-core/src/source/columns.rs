//! Column-name resolution rules.
//!
//! Each canonical field carries an ordered rule list describing the
//! spellings it has gone by across exporter releases. Resolution precedence
//! follows source column order, not rule order: the first column satisfying
//! any rule wins.

/// One acceptable spelling of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    /// Exact lowercased name.
    Is(&'static str),
    /// Lowercased name contains the needle.
    Has(&'static str),
}

impl ColumnRule {
    fn matches(&self, lowercased: &str) -> bool {
        match self {
            ColumnRule::Is(name) => lowercased == *name,
            ColumnRule::Has(needle) => lowercased.contains(needle),
        }
    }
}

/// Resolve a canonical field to a column index.
///
/// `columns` must already be lowercased.
pub fn resolve(columns: &[String], rules: &[ColumnRule]) -> Option<usize> {
    columns
        .iter()
        .position(|column| rules.iter().any(|rule| rule.matches(column)))
}

/// Lowercase a column-name list once, for repeated resolution.
pub fn lowercased(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| c.to_lowercase()).collect()
}

use ColumnRule::{Has, Is};

pub mod song {
    use super::*;

    pub const ID: &[ColumnRule] = &[
        Is("id"),
        Is("songid"),
        Is("song_id"),
        Is("videoid"),
        Is("video_id"),
    ];
    pub const TITLE: &[ColumnRule] = &[Is("title"), Is("name"), Is("songtitle")];
    pub const ARTISTS: &[ColumnRule] = &[
        Is("artist"),
        Is("artists"),
        Is("artiststext"),
        Is("artists_text"),
        Is("artistname"),
    ];
    pub const DURATION: &[ColumnRule] = &[
        Is("duration"),
        Is("durationtext"),
        Is("duration_text"),
        Is("length"),
    ];
    pub const THUMBNAIL: &[ColumnRule] = &[
        Is("thumbnail"),
        Is("thumbnailurl"),
        Is("thumbnail_url"),
        Is("image"),
        Is("artwork"),
    ];
    pub const LIKED_AT: &[ColumnRule] = &[Is("likedat"), Is("liked_at"), Is("liked")];
    pub const PLAY_TIME: &[ColumnRule] = &[Is("totalplaytimems"), Is("playtime"), Is("play_time")];
}

pub mod playlist {
    use super::*;

    pub const ID: &[ColumnRule] = &[Is("id"), Is("playlistid"), Is("playlist_id")];
    pub const NAME: &[ColumnRule] = &[Is("name"), Is("title"), Is("playlistname")];
    pub const BROWSE_ID: &[ColumnRule] = &[Is("browseid"), Is("browse_id")];
}

pub mod album {
    use super::*;

    pub const ID: &[ColumnRule] = &[Is("id"), Is("albumid"), Is("album_id")];
    pub const TITLE: &[ColumnRule] = &[Is("title"), Is("name")];
    pub const YEAR: &[ColumnRule] = &[Is("year")];
    pub const AUTHORS: &[ColumnRule] = &[
        Is("authorstext"),
        Is("authors_text"),
        Is("authors"),
        Is("author"),
    ];
    pub const SHARE_URL: &[ColumnRule] = &[Is("shareurl"), Is("share_url")];
    pub const TIMESTAMP: &[ColumnRule] = &[Is("timestamp")];
    pub const BOOKMARKED_AT: &[ColumnRule] = &[Is("bookmarkedat"), Is("bookmarked_at")];
}

pub mod artist {
    use super::*;

    pub const ID: &[ColumnRule] = &[Is("id"), Is("artistid"), Is("artist_id")];
    pub const NAME: &[ColumnRule] = &[Is("name"), Is("title")];
}

/// Association tables: looser rules, since exporters were least consistent
/// about mapping column names.
pub mod mapping {
    use super::*;

    pub const PLAYLIST_ID: &[ColumnRule] = &[Is("playlistid"), Is("playlist_id"), Has("playlist")];
    pub const SONG_ID: &[ColumnRule] = &[Is("songid"), Is("song_id"), Has("song"), Has("video")];
    pub const ALBUM_ID: &[ColumnRule] = &[Is("albumid"), Is("album_id"), Has("album")];
    pub const ARTIST_ID: &[ColumnRule] = &[Is("artistid"), Is("artist_id"), Has("artist")];
    pub const POSITION: &[ColumnRule] = &[Is("position"), Is("pos"), Is("order"), Is("index")];
}

pub mod event {
    use super::*;

    pub const TIMESTAMP: &[ColumnRule] = &[Is("timestamp"), Is("time"), Is("date")];
    pub const PLAY_TIME: &[ColumnRule] = &[Is("playtime"), Is("play_time"), Is("playtimems")];
}

pub mod format {
    use super::*;

    pub const ITAG: &[ColumnRule] = &[Is("itag")];
    pub const MIME_TYPE: &[ColumnRule] = &[Is("mimetype"), Is("mime_type")];
    pub const BITRATE: &[ColumnRule] = &[Is("bitrate")];
    pub const CONTENT_LENGTH: &[ColumnRule] = &[Is("contentlength"), Is("content_length")];
    pub const LAST_MODIFIED: &[ColumnRule] = &[Is("lastmodified"), Is("last_modified")];
    pub const LOUDNESS: &[ColumnRule] = &[Is("loudnessdb"), Is("loudness_db"), Is("loudness")];
}

pub mod lyrics {
    use super::*;

    pub const FIXED: &[ColumnRule] = &[Is("fixed"), Is("lyrics"), Is("text")];
    pub const SYNCED: &[ColumnRule] = &[Is("synced"), Is("syncedlyrics"), Is("synced_lyrics")];
}

pub mod search {
    use super::*;

    pub const QUERY: &[ColumnRule] = &[Is("query"), Is("text"), Is("searchquery"), Is("search_query")];
}

/// Header rules for the CSV import path, matched against trimmed lowercased
/// header cells.
pub mod csv {
    use super::*;

    pub const PLAYLIST_BROWSE_ID: &[ColumnRule] =
        &[Has("playlistbrowseid"), Has("playlist_browse_id")];
    pub const PLAYLIST_NAME: &[ColumnRule] =
        &[Has("playlistname"), Has("playlist_name"), Is("playlist")];
    pub const SONG_ID: &[ColumnRule] = &[Has("songid"), Has("song_id"), Is("id"), Has("videoid")];
    pub const TITLE: &[ColumnRule] = &[Is("title"), Has("songtitle"), Is("name")];
    pub const ARTISTS: &[ColumnRule] = &[Is("artists"), Is("artist"), Has("artiststext")];
    pub const DURATION: &[ColumnRule] = &[Is("duration"), Has("durationtext")];
    pub const THUMBNAIL: &[ColumnRule] = &[Has("thumbnail"), Has("image"), Has("artwork")];
}
