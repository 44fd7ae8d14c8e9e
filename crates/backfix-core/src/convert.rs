//! Conversion orchestration: introspect, locate, extract, link.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::source::database::SourceDatabase;
use crate::source::{extract, link, locate};
use crate::types::ConversionResult;

/// Parse a materialized source database file into a [`ConversionResult`].
///
/// Extraction is forgiving end to end: a source whose table listing cannot
/// even be read still returns a (mostly empty) result carrying the failure
/// in `errors`. `Err` is reserved for environment problems around the file
/// itself.
pub(crate) fn parse_sqlite_file(path: &Path) -> Result<ConversionResult> {
    let mut result = ConversionResult::new();
    let db = SourceDatabase::open(path)?;

    let table_names = match db.table_names() {
        Ok(names) => names,
        Err(e) => {
            warn!("source introspection failed: {e}");
            result.errors.push(format!("Database parsing error: {e}"));
            return Ok(result);
        }
    };

    for name in &table_names {
        match db.profile(name) {
            Ok(profile) => result.table_info.push(profile),
            Err(_) => {
                result
                    .warnings
                    .push(format!("Could not read table info for {name}"));
            }
        }
    }

    if let Some(table) = locate::locate(&table_names, &locate::SONG) {
        let songs = extract::extract_songs(&db, table, &mut result);
        result.songs = songs;
    } else {
        debug!("no songs table located");
    }

    if let Some(table) = locate::locate(&table_names, &locate::PLAYLIST) {
        let playlists = extract::extract_playlists(&db, table, &mut result);
        result.playlists = playlists;
    }

    if let Some(table) = locate::locate(&table_names, &locate::SONG_PLAYLIST_MAP) {
        if !result.playlists.is_empty() && !result.songs.is_empty() {
            link::link_songs_to_playlists(&db, table, &mut result);
        }
    }

    if let Some(table) = locate::locate(&table_names, &locate::ALBUM) {
        let albums = extract::extract_albums(&db, table, &mut result);
        result.albums = albums;
    }
    if let Some(table) = locate::locate(&table_names, &locate::SONG_ALBUM_MAP) {
        let maps = extract::extract_song_album_maps(&db, table, &mut result);
        result.song_album_maps = maps;
    }
    if let Some(table) = locate::locate(&table_names, &locate::ARTIST) {
        let artists = extract::extract_artists(&db, table, &mut result);
        result.artists = artists;
    }
    if let Some(table) = locate::locate(&table_names, &locate::SONG_ARTIST_MAP) {
        let maps = extract::extract_song_artist_maps(&db, table, &mut result);
        result.song_artist_maps = maps;
    }
    if let Some(table) = locate::locate(&table_names, &locate::EVENT) {
        let events = extract::extract_events(&db, table, &mut result);
        result.events = events;
    }
    if let Some(table) = locate::locate(&table_names, &locate::FORMAT) {
        let formats = extract::extract_formats(&db, table, &mut result);
        result.formats = formats;
    }
    if let Some(table) = locate::locate(&table_names, &locate::LYRICS) {
        let lyrics = extract::extract_lyrics(&db, table, &mut result);
        result.lyrics = lyrics;
    }
    if let Some(table) = locate::locate(&table_names, &locate::SEARCH_QUERY) {
        let queries = extract::extract_search_queries(&db, table, &mut result);
        result.search_queries = queries;
    }

    link::prune_unresolved(&mut result);

    // everything starts selected; the caller narrows the set at export time
    for playlist in &mut result.playlists {
        playlist.selected = true;
    }

    debug!(
        songs = result.songs.len(),
        playlists = result.playlists.len(),
        warnings = result.warnings.len(),
        "parsed source database"
    );
    Ok(result)
}
