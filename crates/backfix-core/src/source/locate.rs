//! Heuristic table location.
//!
//! The exporter that produced the backup renamed its tables more than once
//! over the years, so each conceptual entity is found by a curated name
//! list first and a substring fallback second.

/// Name-matching rules for one conceptual entity.
pub struct TableMatcher {
    /// Exact names, matched case-sensitively.
    pub exact: &'static [&'static str],
    /// Fallback substring sets; a table matches when its lowercased name
    /// contains every substring of any one set.
    pub fuzzy: &'static [&'static [&'static str]],
}

pub const SONG: TableMatcher = TableMatcher {
    exact: &["Song", "Songs", "song", "songs", "Track", "Tracks", "track", "tracks"],
    fuzzy: &[&["song"], &["track"]],
};

pub const PLAYLIST: TableMatcher = TableMatcher {
    exact: &["Playlist", "Playlists", "playlist", "playlists"],
    fuzzy: &[&["playlist"]],
};

pub const SONG_PLAYLIST_MAP: TableMatcher = TableMatcher {
    exact: &[
        "SongPlaylistMap",
        "PlaylistSongMap",
        "SongInPlaylist",
        "PlaylistSong",
        "playlist_song",
    ],
    fuzzy: &[&["playlist", "song"], &["song", "map"]],
};

pub const ALBUM: TableMatcher = TableMatcher {
    exact: &["Album", "Albums", "album", "albums"],
    fuzzy: &[&["album"]],
};

pub const SONG_ALBUM_MAP: TableMatcher = TableMatcher {
    exact: &["SongAlbumMap"],
    fuzzy: &[&["album", "map"], &["song", "album"]],
};

pub const ARTIST: TableMatcher = TableMatcher {
    exact: &["Artist", "Artists", "artist", "artists"],
    fuzzy: &[&["artist"]],
};

pub const SONG_ARTIST_MAP: TableMatcher = TableMatcher {
    exact: &["SongArtistMap"],
    fuzzy: &[&["artist", "map"], &["song", "artist"]],
};

pub const EVENT: TableMatcher = TableMatcher {
    exact: &["Event", "Events", "event", "events"],
    fuzzy: &[&["event"]],
};

pub const FORMAT: TableMatcher = TableMatcher {
    exact: &["Format", "Formats", "format", "formats"],
    fuzzy: &[&["format"]],
};

pub const LYRICS: TableMatcher = TableMatcher {
    exact: &["Lyrics", "lyrics"],
    fuzzy: &[&["lyric"]],
};

pub const SEARCH_QUERY: TableMatcher = TableMatcher {
    exact: &["SearchQuery", "SearchQueries", "searchquery", "search_query"],
    fuzzy: &[&["search"]],
};

/// Find the source table most likely holding the given entity.
///
/// Exact names win outright; otherwise the first table (in source listing
/// order) whose lowercased name satisfies any fuzzy set is taken.
pub fn locate<'a>(table_names: &'a [String], matcher: &TableMatcher) -> Option<&'a str> {
    if let Some(hit) = table_names
        .iter()
        .find(|name| matcher.exact.contains(&name.as_str()))
    {
        return Some(hit);
    }

    table_names
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            matcher
                .fuzzy
                .iter()
                .any(|set| set.iter().all(|needle| lower.contains(needle)))
        })
        .map(|name| name.as_str())
}
