//! Target database generation.
//!
//! Writes a fresh database in the exact shape Cubic Music expects: the
//! fixed schema from [`TARGET_SCHEMA`], the ORM bookkeeping tables, the
//! converted records, and the version stamp. The whole write either
//! succeeds or the scratch file is abandoned; no partial image escapes.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::Result;
use crate::schema::target::TARGET_SCHEMA;
use crate::types::ConversionResult;

/// Render the target's `durationText` display field from canonical seconds.
fn duration_text(seconds: &str) -> String {
    let total: i64 = seconds.parse().unwrap_or(0);
    format!("{}:{:02}", total / 60, total % 60)
}

pub(crate) fn generate_sqlite_file(
    result: &ConversionResult,
    selected_ids: Option<&[i64]>,
    path: &Path,
) -> Result<()> {
    let conn = Connection::open(path)?;

    let mut ddl = String::new();
    for statement in TARGET_SCHEMA.ddl() {
        ddl.push_str(&statement);
        ddl.push_str(";\n");
    }
    conn.execute_batch(&ddl)?;

    // ORM bookkeeping: identity hash and locale, checked by the target app
    conn.execute_batch(
        "CREATE TABLE room_master_table (id INTEGER PRIMARY KEY, identity_hash TEXT);\n\
         CREATE TABLE android_metadata (locale TEXT);",
    )?;
    conn.execute(
        "INSERT INTO room_master_table (id, identity_hash) VALUES (42, ?1)",
        params![TARGET_SCHEMA.identity_hash],
    )?;
    conn.execute(
        "INSERT INTO android_metadata VALUES (?1)",
        params![TARGET_SCHEMA.locale],
    )?;

    insert_songs(&conn, result)?;
    insert_playlists(&conn, result, selected_ids)?;
    insert_library(&conn, result)?;

    conn.pragma_update(None, "user_version", TARGET_SCHEMA.version)?;
    debug!(path = %path.display(), "generated target database");
    Ok(())
}

fn insert_songs(conn: &Connection, result: &ConversionResult) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO Song (id, title, artistsText, durationText, thumbnailUrl, likedAt, totalPlayTimeMs) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    // first occurrence wins when the source carried duplicate ids
    let mut inserted: HashSet<&str> = HashSet::new();
    for song in &result.songs {
        if !inserted.insert(song.song_id.as_str()) {
            continue;
        }
        let title = if song.title.is_empty() {
            "Unknown Title"
        } else {
            song.title.as_str()
        };
        stmt.execute(params![
            song.song_id,
            title,
            song.artists,
            duration_text(&song.duration),
            song.thumbnail_url,
            song.liked_at,
            song.total_play_time_ms,
        ])?;
    }
    Ok(())
}

fn insert_playlists(
    conn: &Connection,
    result: &ConversionResult,
    selected_ids: Option<&[i64]>,
) -> Result<()> {
    let mut insert_playlist =
        conn.prepare("INSERT INTO Playlist (name, browseId) VALUES (?1, ?2)")?;
    let mut insert_member = conn.prepare(
        "INSERT OR REPLACE INTO SongPlaylistMap (songId, playlistId, position) VALUES (?1, ?2, ?3)",
    )?;

    for playlist in result.exported_playlists(selected_ids) {
        insert_playlist.execute(params![playlist.name, playlist.browse_id])?;
        // source playlist ids are renumbered; membership goes by value
        let playlist_id = conn.last_insert_rowid();
        for (index, song) in playlist.songs.iter().enumerate() {
            insert_member.execute(params![song.song_id, playlist_id, index as i64])?;
        }
    }
    Ok(())
}

fn insert_library(conn: &Connection, result: &ConversionResult) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO Album (id, title, thumbnailUrl, year, authorsText, shareUrl, timestamp, bookmarkedAt) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for album in &result.albums {
        stmt.execute(params![
            album.id,
            album.title,
            album.thumbnail_url,
            album.year,
            album.authors_text,
            album.share_url,
            album.timestamp,
            album.bookmarked_at,
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO Artist (id, name, thumbnailUrl, timestamp, bookmarkedAt) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for artist in &result.artists {
        stmt.execute(params![
            artist.id,
            artist.name,
            artist.thumbnail_url,
            artist.timestamp,
            artist.bookmarked_at,
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO SongAlbumMap (songId, albumId, position) VALUES (?1, ?2, ?3)",
    )?;
    for map in &result.song_album_maps {
        stmt.execute(params![map.song_id, map.album_id, map.position])?;
    }

    let mut stmt = conn
        .prepare("INSERT OR REPLACE INTO SongArtistMap (songId, artistId) VALUES (?1, ?2)")?;
    for map in &result.song_artist_maps {
        stmt.execute(params![map.song_id, map.artist_id])?;
    }

    // events are append-only history; duplicates are legitimate
    let mut stmt =
        conn.prepare("INSERT INTO Event (songId, timestamp, playTime) VALUES (?1, ?2, ?3)")?;
    for event in &result.events {
        stmt.execute(params![event.song_id, event.timestamp, event.play_time])?;
    }

    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO Format (songId, itag, mimeType, bitrate, contentLength, lastModified, loudnessDb) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for format in &result.formats {
        stmt.execute(params![
            format.song_id,
            format.itag,
            format.mime_type,
            format.bitrate,
            format.content_length,
            format.last_modified,
            format.loudness_db,
        ])?;
    }

    let mut stmt =
        conn.prepare("INSERT OR REPLACE INTO Lyrics (songId, fixed, synced) VALUES (?1, ?2, ?3)")?;
    for lyrics in &result.lyrics {
        stmt.execute(params![lyrics.song_id, lyrics.fixed, lyrics.synced])?;
    }

    // the unique index makes repeats a no-op
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO SearchQuery (query) VALUES (?1)")?;
    for search in &result.search_queries {
        stmt.execute(params![search.query])?;
    }

    Ok(())
}
