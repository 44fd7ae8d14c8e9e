//! Entity extraction from located source tables.
//!
//! Extractors never abort the run: a bad row is dropped (with or without a
//! warning), a bad table is reported as an error, and everything readable
//! still comes back.

use rusqlite::types::Value;
use tracing::debug;

use crate::sanitize::{duration, value};
use crate::source::columns::{self, lowercased, resolve};
use crate::source::database::{SourceDatabase, SourceTable};
use crate::types::{
    Album, Artist, CleaningEntry, ConversionResult, Event, Format, Lyrics, Playlist, RowOutcome,
    SearchQuery, Song, SongAlbumMap, SongArtistMap,
};

/// Fetch a cell by resolved column index.
pub(crate) fn cell<'a>(cells: &'a [Value], idx: Option<usize>) -> Option<&'a Value> {
    idx.and_then(|i| cells.get(i))
}

/// Integer coercion: integers pass through, reals truncate, numeric text
/// parses; NULL and everything else is `None`.
pub(crate) fn integer_cell(cells: &[Value], idx: Option<usize>) -> Option<i64> {
    match cell(cells, idx)? {
        Value::Integer(i) => Some(*i),
        Value::Real(f) => Some(*f as i64),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

fn float_cell(cells: &[Value], idx: Option<usize>) -> Option<f64> {
    match cell(cells, idx)? {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Read a table, reporting a whole-table failure under the entity's name.
fn read_entity_table(
    db: &SourceDatabase,
    table: &str,
    entity: &str,
    errors: &mut Vec<String>,
) -> Option<SourceTable> {
    match db.read_table(table) {
        Ok(data) => Some(data),
        Err(e) => {
            errors.push(format!("Error reading {entity} table: {e}"));
            None
        }
    }
}

struct SongColumns {
    id: Option<usize>,
    title: Option<usize>,
    artists: Option<usize>,
    duration: Option<usize>,
    thumbnail: Option<usize>,
    liked_at: Option<usize>,
    play_time: Option<usize>,
}

impl SongColumns {
    fn resolve(columns: &[String]) -> Self {
        SongColumns {
            id: resolve(columns, columns::song::ID),
            title: resolve(columns, columns::song::TITLE),
            artists: resolve(columns, columns::song::ARTISTS),
            duration: resolve(columns, columns::song::DURATION),
            thumbnail: resolve(columns, columns::song::THUMBNAIL),
            liked_at: resolve(columns, columns::song::LIKED_AT),
            play_time: resolve(columns, columns::song::PLAY_TIME),
        }
    }
}

fn song_from_row(
    cells: &[Value],
    fields: &SongColumns,
    report: &mut Vec<CleaningEntry>,
) -> RowOutcome<Song> {
    let song = Song {
        song_id: value::clean(cell(cells, fields.id), "songId", report),
        title: value::clean(cell(cells, fields.title), "title", report),
        artists: value::clean(cell(cells, fields.artists), "artists", report),
        duration: duration::clean(cell(cells, fields.duration), report),
        thumbnail_url: value::clean(cell(cells, fields.thumbnail), "thumbnailUrl", report),
        liked_at: integer_cell(cells, fields.liked_at).filter(|v| *v != 0),
        total_play_time_ms: integer_cell(cells, fields.play_time).unwrap_or(0),
    };
    // every other table's foreign keys hang off this identifier
    if song.song_id.is_empty() {
        return RowOutcome::DroppedWithWarning("Skipped song with empty ID".to_string());
    }
    RowOutcome::Kept(song)
}

pub fn extract_songs(db: &SourceDatabase, table: &str, result: &mut ConversionResult) -> Vec<Song> {
    let mut songs = Vec::new();
    let Some(data) = read_entity_table(db, table, "songs", &mut result.errors) else {
        return songs;
    };
    let columns = lowercased(&data.columns);
    let fields = SongColumns::resolve(&columns);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse song row".to_string());
            continue;
        };
        match song_from_row(cells, &fields, &mut result.cleaning_report) {
            RowOutcome::Kept(song) => songs.push(song),
            RowOutcome::DroppedSilently => {}
            RowOutcome::DroppedWithWarning(reason) => result.warnings.push(reason),
        }
    }
    debug!(table, count = songs.len(), "extracted songs");
    songs
}

struct PlaylistColumns {
    id: Option<usize>,
    name: Option<usize>,
    browse_id: Option<usize>,
}

impl PlaylistColumns {
    fn resolve(columns: &[String]) -> Self {
        PlaylistColumns {
            id: resolve(columns, columns::playlist::ID),
            name: resolve(columns, columns::playlist::NAME),
            browse_id: resolve(columns, columns::playlist::BROWSE_ID),
        }
    }
}

fn playlist_from_row(
    cells: &[Value],
    fields: &PlaylistColumns,
    fallback_id: i64,
    report: &mut Vec<CleaningEntry>,
) -> Playlist {
    let id = integer_cell(cells, fields.id)
        .filter(|v| *v != 0)
        .unwrap_or(fallback_id);
    let mut name = value::clean(cell(cells, fields.name), "playlistName", report);
    if name.is_empty() {
        name = "Unknown Playlist".to_string();
    }
    Playlist {
        id,
        name,
        browse_id: value::clean(cell(cells, fields.browse_id), "browseId", report),
        songs: Vec::new(),
        selected: true,
    }
}

pub fn extract_playlists(
    db: &SourceDatabase,
    table: &str,
    result: &mut ConversionResult,
) -> Vec<Playlist> {
    let mut playlists = Vec::new();
    let Some(data) = read_entity_table(db, table, "playlists", &mut result.errors) else {
        return playlists;
    };
    let columns = lowercased(&data.columns);
    let fields = PlaylistColumns::resolve(&columns);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse playlist row".to_string());
            continue;
        };
        let fallback_id = playlists.len() as i64 + 1;
        let playlist = playlist_from_row(cells, &fields, fallback_id, &mut result.cleaning_report);
        playlists.push(playlist);
    }
    debug!(table, count = playlists.len(), "extracted playlists");
    playlists
}

struct AlbumColumns {
    id: Option<usize>,
    title: Option<usize>,
    thumbnail: Option<usize>,
    year: Option<usize>,
    authors: Option<usize>,
    share_url: Option<usize>,
    timestamp: Option<usize>,
    bookmarked_at: Option<usize>,
}

impl AlbumColumns {
    fn resolve(columns: &[String]) -> Self {
        AlbumColumns {
            id: resolve(columns, columns::album::ID),
            title: resolve(columns, columns::album::TITLE),
            thumbnail: resolve(columns, columns::song::THUMBNAIL),
            year: resolve(columns, columns::album::YEAR),
            authors: resolve(columns, columns::album::AUTHORS),
            share_url: resolve(columns, columns::album::SHARE_URL),
            timestamp: resolve(columns, columns::album::TIMESTAMP),
            bookmarked_at: resolve(columns, columns::album::BOOKMARKED_AT),
        }
    }
}

fn album_from_row(
    cells: &[Value],
    fields: &AlbumColumns,
    report: &mut Vec<CleaningEntry>,
) -> RowOutcome<Album> {
    let album = Album {
        id: value::clean(cell(cells, fields.id), "albumId", report),
        title: value::clean(cell(cells, fields.title), "albumTitle", report),
        thumbnail_url: value::clean(cell(cells, fields.thumbnail), "thumbnailUrl", report),
        year: value::clean(cell(cells, fields.year), "year", report),
        authors_text: value::clean(cell(cells, fields.authors), "authorsText", report),
        share_url: value::clean(cell(cells, fields.share_url), "shareUrl", report),
        timestamp: integer_cell(cells, fields.timestamp),
        bookmarked_at: integer_cell(cells, fields.bookmarked_at),
    };
    if album.id.is_empty() {
        return RowOutcome::DroppedWithWarning("Skipped album with empty ID".to_string());
    }
    RowOutcome::Kept(album)
}

pub fn extract_albums(db: &SourceDatabase, table: &str, result: &mut ConversionResult) -> Vec<Album> {
    let mut albums = Vec::new();
    let Some(data) = read_entity_table(db, table, "albums", &mut result.errors) else {
        return albums;
    };
    let columns = lowercased(&data.columns);
    let fields = AlbumColumns::resolve(&columns);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse album row".to_string());
            continue;
        };
        match album_from_row(cells, &fields, &mut result.cleaning_report) {
            RowOutcome::Kept(album) => albums.push(album),
            RowOutcome::DroppedSilently => {}
            RowOutcome::DroppedWithWarning(reason) => result.warnings.push(reason),
        }
    }
    debug!(table, count = albums.len(), "extracted albums");
    albums
}

struct ArtistColumns {
    id: Option<usize>,
    name: Option<usize>,
    thumbnail: Option<usize>,
    timestamp: Option<usize>,
    bookmarked_at: Option<usize>,
}

impl ArtistColumns {
    fn resolve(columns: &[String]) -> Self {
        ArtistColumns {
            id: resolve(columns, columns::artist::ID),
            name: resolve(columns, columns::artist::NAME),
            thumbnail: resolve(columns, columns::song::THUMBNAIL),
            timestamp: resolve(columns, columns::album::TIMESTAMP),
            bookmarked_at: resolve(columns, columns::album::BOOKMARKED_AT),
        }
    }
}

fn artist_from_row(
    cells: &[Value],
    fields: &ArtistColumns,
    report: &mut Vec<CleaningEntry>,
) -> RowOutcome<Artist> {
    let artist = Artist {
        id: value::clean(cell(cells, fields.id), "artistId", report),
        name: value::clean(cell(cells, fields.name), "artistName", report),
        thumbnail_url: value::clean(cell(cells, fields.thumbnail), "thumbnailUrl", report),
        timestamp: integer_cell(cells, fields.timestamp),
        bookmarked_at: integer_cell(cells, fields.bookmarked_at),
    };
    if artist.id.is_empty() {
        return RowOutcome::DroppedWithWarning("Skipped artist with empty ID".to_string());
    }
    RowOutcome::Kept(artist)
}

pub fn extract_artists(
    db: &SourceDatabase,
    table: &str,
    result: &mut ConversionResult,
) -> Vec<Artist> {
    let mut artists = Vec::new();
    let Some(data) = read_entity_table(db, table, "artists", &mut result.errors) else {
        return artists;
    };
    let columns = lowercased(&data.columns);
    let fields = ArtistColumns::resolve(&columns);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse artist row".to_string());
            continue;
        };
        match artist_from_row(cells, &fields, &mut result.cleaning_report) {
            RowOutcome::Kept(artist) => artists.push(artist),
            RowOutcome::DroppedSilently => {}
            RowOutcome::DroppedWithWarning(reason) => result.warnings.push(reason),
        }
    }
    debug!(table, count = artists.len(), "extracted artists");
    artists
}

fn song_album_map_from_row(
    cells: &[Value],
    song_idx: usize,
    album_idx: usize,
    position_idx: Option<usize>,
    report: &mut Vec<CleaningEntry>,
) -> RowOutcome<SongAlbumMap> {
    let song_id = value::clean(cell(cells, Some(song_idx)), "mappingSongId", report);
    let album_id = value::clean(cell(cells, Some(album_idx)), "mappingAlbumId", report);
    // a half-keyed association row can never be relinked
    if song_id.is_empty() || album_id.is_empty() {
        return RowOutcome::DroppedSilently;
    }
    RowOutcome::Kept(SongAlbumMap {
        song_id,
        album_id,
        position: integer_cell(cells, position_idx),
    })
}

pub fn extract_song_album_maps(
    db: &SourceDatabase,
    table: &str,
    result: &mut ConversionResult,
) -> Vec<SongAlbumMap> {
    let mut maps = Vec::new();
    let Some(data) = read_entity_table(db, table, "song-album map", &mut result.errors) else {
        return maps;
    };
    let columns = lowercased(&data.columns);
    let song_idx = resolve(&columns, columns::mapping::SONG_ID);
    let album_idx = resolve(&columns, columns::mapping::ALBUM_ID);
    let position_idx = resolve(&columns, columns::mapping::POSITION);
    let (Some(song_idx), Some(album_idx)) = (song_idx, album_idx) else {
        result
            .warnings
            .push("Could not find song-album mapping columns".to_string());
        return maps;
    };

    for row in &data.rows {
        let Ok(cells) = row else {
            result
                .warnings
                .push("Could not parse song-album map row".to_string());
            continue;
        };
        match song_album_map_from_row(
            cells,
            song_idx,
            album_idx,
            position_idx,
            &mut result.cleaning_report,
        ) {
            RowOutcome::Kept(map) => maps.push(map),
            RowOutcome::DroppedSilently => {}
            RowOutcome::DroppedWithWarning(reason) => result.warnings.push(reason),
        }
    }
    debug!(table, count = maps.len(), "extracted song-album maps");
    maps
}

fn song_artist_map_from_row(
    cells: &[Value],
    song_idx: usize,
    artist_idx: usize,
    report: &mut Vec<CleaningEntry>,
) -> RowOutcome<SongArtistMap> {
    let song_id = value::clean(cell(cells, Some(song_idx)), "mappingSongId", report);
    let artist_id = value::clean(cell(cells, Some(artist_idx)), "mappingArtistId", report);
    if song_id.is_empty() || artist_id.is_empty() {
        return RowOutcome::DroppedSilently;
    }
    RowOutcome::Kept(SongArtistMap { song_id, artist_id })
}

pub fn extract_song_artist_maps(
    db: &SourceDatabase,
    table: &str,
    result: &mut ConversionResult,
) -> Vec<SongArtistMap> {
    let mut maps = Vec::new();
    let Some(data) = read_entity_table(db, table, "song-artist map", &mut result.errors) else {
        return maps;
    };
    let columns = lowercased(&data.columns);
    let song_idx = resolve(&columns, columns::mapping::SONG_ID);
    let artist_idx = resolve(&columns, columns::mapping::ARTIST_ID);
    let (Some(song_idx), Some(artist_idx)) = (song_idx, artist_idx) else {
        result
            .warnings
            .push("Could not find song-artist mapping columns".to_string());
        return maps;
    };

    for row in &data.rows {
        let Ok(cells) = row else {
            result
                .warnings
                .push("Could not parse song-artist map row".to_string());
            continue;
        };
        match song_artist_map_from_row(cells, song_idx, artist_idx, &mut result.cleaning_report) {
            RowOutcome::Kept(map) => maps.push(map),
            RowOutcome::DroppedSilently => {}
            RowOutcome::DroppedWithWarning(reason) => result.warnings.push(reason),
        }
    }
    debug!(table, count = maps.len(), "extracted song-artist maps");
    maps
}

pub fn extract_events(db: &SourceDatabase, table: &str, result: &mut ConversionResult) -> Vec<Event> {
    let mut events = Vec::new();
    let Some(data) = read_entity_table(db, table, "events", &mut result.errors) else {
        return events;
    };
    let columns = lowercased(&data.columns);
    let Some(song_idx) = resolve(&columns, columns::mapping::SONG_ID) else {
        result.warnings.push("Could not find event song column".to_string());
        return events;
    };
    let timestamp_idx = resolve(&columns, columns::event::TIMESTAMP);
    let play_time_idx = resolve(&columns, columns::event::PLAY_TIME);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse event row".to_string());
            continue;
        };
        let song_id = value::clean(cell(cells, Some(song_idx)), "songId", &mut result.cleaning_report);
        if song_id.is_empty() {
            result
                .warnings
                .push("Skipped event with empty song ID".to_string());
            continue;
        }
        events.push(Event {
            song_id,
            timestamp: integer_cell(cells, timestamp_idx).unwrap_or(0),
            play_time: integer_cell(cells, play_time_idx).unwrap_or(0),
        });
    }
    debug!(table, count = events.len(), "extracted events");
    events
}

pub fn extract_formats(db: &SourceDatabase, table: &str, result: &mut ConversionResult) -> Vec<Format> {
    let mut formats = Vec::new();
    let Some(data) = read_entity_table(db, table, "formats", &mut result.errors) else {
        return formats;
    };
    let columns = lowercased(&data.columns);
    let Some(song_idx) = resolve(&columns, columns::mapping::SONG_ID) else {
        result.warnings.push("Could not find format song column".to_string());
        return formats;
    };
    let itag_idx = resolve(&columns, columns::format::ITAG);
    let mime_idx = resolve(&columns, columns::format::MIME_TYPE);
    let bitrate_idx = resolve(&columns, columns::format::BITRATE);
    let length_idx = resolve(&columns, columns::format::CONTENT_LENGTH);
    let modified_idx = resolve(&columns, columns::format::LAST_MODIFIED);
    let loudness_idx = resolve(&columns, columns::format::LOUDNESS);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse format row".to_string());
            continue;
        };
        let song_id = value::clean(cell(cells, Some(song_idx)), "songId", &mut result.cleaning_report);
        if song_id.is_empty() {
            result
                .warnings
                .push("Skipped format with empty song ID".to_string());
            continue;
        }
        formats.push(Format {
            song_id,
            itag: integer_cell(cells, itag_idx),
            mime_type: value::clean(cell(cells, mime_idx), "mimeType", &mut result.cleaning_report),
            bitrate: integer_cell(cells, bitrate_idx),
            content_length: integer_cell(cells, length_idx),
            last_modified: integer_cell(cells, modified_idx),
            loudness_db: float_cell(cells, loudness_idx),
        });
    }
    debug!(table, count = formats.len(), "extracted formats");
    formats
}

pub fn extract_lyrics(db: &SourceDatabase, table: &str, result: &mut ConversionResult) -> Vec<Lyrics> {
    let mut lyrics = Vec::new();
    let Some(data) = read_entity_table(db, table, "lyrics", &mut result.errors) else {
        return lyrics;
    };
    let columns = lowercased(&data.columns);
    let Some(song_idx) = resolve(&columns, columns::mapping::SONG_ID) else {
        result.warnings.push("Could not find lyrics song column".to_string());
        return lyrics;
    };
    let fixed_idx = resolve(&columns, columns::lyrics::FIXED);
    let synced_idx = resolve(&columns, columns::lyrics::SYNCED);

    for row in &data.rows {
        let Ok(cells) = row else {
            result.warnings.push("Could not parse lyrics row".to_string());
            continue;
        };
        let song_id = value::clean(cell(cells, Some(song_idx)), "songId", &mut result.cleaning_report);
        if song_id.is_empty() {
            result
                .warnings
                .push("Skipped lyrics with empty song ID".to_string());
            continue;
        }
        lyrics.push(Lyrics {
            song_id,
            fixed: value::clean(cell(cells, fixed_idx), "fixed", &mut result.cleaning_report),
            synced: value::clean(cell(cells, synced_idx), "synced", &mut result.cleaning_report),
        });
    }
    debug!(table, count = lyrics.len(), "extracted lyrics");
    lyrics
}

pub fn extract_search_queries(
    db: &SourceDatabase,
    table: &str,
    result: &mut ConversionResult,
) -> Vec<SearchQuery> {
    let mut queries = Vec::new();
    let Some(data) = read_entity_table(db, table, "search queries", &mut result.errors) else {
        return queries;
    };
    let columns = lowercased(&data.columns);
    let Some(query_idx) = resolve(&columns, columns::search::QUERY) else {
        result
            .warnings
            .push("Could not find search query column".to_string());
        return queries;
    };

    for row in &data.rows {
        let Ok(cells) = row else {
            result
                .warnings
                .push("Could not parse search query row".to_string());
            continue;
        };
        let query = value::clean(cell(cells, Some(query_idx)), "searchQuery", &mut result.cleaning_report);
        if query.is_empty() {
            result
                .warnings
                .push("Skipped search query with empty text".to_string());
            continue;
        }
        queries.push(SearchQuery { query });
    }
    debug!(table, count = queries.len(), "extracted search queries");
    queries
}
