//! Integration tests for the Converter public interface.
//!
//! Each test drives the pipeline end to end: build a backup the way Kreate
//! would have written it, parse it, and inspect the regenerated image with
//! a plain SQLite connection.

use backfix_core::{detect_format, ConvertError, Converter, SourceFormat, TARGET_SCHEMA};
use rusqlite::Connection;
use tempfile::TempDir;

/// Build a Kreate-style backup with the drift and dirt seen in the wild.
fn create_kreate_backup() -> Vec<u8> {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("kreate.sqlite");
    let conn = Connection::open(&path).expect("Failed to create backup");

    conn.execute_batch(
        "CREATE TABLE Song (id TEXT, title TEXT, artistsText TEXT, durationText TEXT, thumbnailUrl TEXT, likedAt INTEGER, totalPlayTimeMs INTEGER);
         CREATE TABLE Playlist (id INTEGER, name TEXT, browseId TEXT);
         CREATE TABLE SongPlaylistMap (songId TEXT, playlistId INTEGER, position INTEGER);
         INSERT INTO Song VALUES ('s1', '  First Song  ', 'Artist A', '3:45', 'http://img/1.jpg', 1700000000000, 5000);
         INSERT INTO Song VALUES ('s2', 'Second Song', 'Artist B', '240000', NULL, 0, NULL);
         INSERT INTO Song VALUES ('s3', 'Third Song', 'Artist C', '180', '', NULL, 42);
         INSERT INTO Song VALUES ('', 'Ghost', '', '', '', NULL, NULL);
         INSERT INTO Playlist VALUES (7, 'Road Trip', 'VL123');
         INSERT INTO SongPlaylistMap VALUES ('s1', 7, 2);
         INSERT INTO SongPlaylistMap VALUES ('s2', 7, 0);
         INSERT INTO SongPlaylistMap VALUES ('s3', 7, 1);
         INSERT INTO SongPlaylistMap VALUES ('missing', 7, 3);",
    )
    .expect("Failed to populate backup");

    drop(conn);
    std::fs::read(&path).expect("Failed to read backup")
}

/// Materialize generated image bytes and open them with SQLite.
fn reopen_image(bytes: &[u8]) -> (TempDir, Connection) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("image.sqlite");
    std::fs::write(&path, bytes).expect("Failed to write image");
    let conn = Connection::open(&path).expect("Failed to open image");
    (temp_dir, conn)
}

#[test]
fn test_parse_repairs_and_reports() {
    let converter = Converter::new().unwrap();
    let result = converter.parse(&create_kreate_backup()).unwrap();

    assert_eq!(result.songs.len(), 3);
    let first = result.songs.iter().find(|s| s.song_id == "s1").unwrap();
    assert_eq!(first.title, "First Song");
    assert_eq!(first.duration, "225");
    assert_eq!(first.liked_at, Some(1700000000000));

    let second = result.songs.iter().find(|s| s.song_id == "s2").unwrap();
    assert_eq!(second.duration, "240");
    assert_eq!(second.liked_at, None);
    assert_eq!(second.total_play_time_ms, 0);

    // every repair is written down
    assert!(result.cleaning_report.iter().any(|e| {
        e.field == "title" && e.original == "  First Song  " && e.issue == "whitespace trimmed"
    }));
    assert!(result.cleaning_report.iter().any(|e| {
        e.field == "duration" && e.cleaned == "225" && e.issue == "parsed from mm:ss format"
    }));
    assert!(result.cleaning_report.iter().any(|e| {
        e.field == "duration" && e.cleaned == "240" && e.issue == "converted from milliseconds"
    }));

    assert!(result
        .warnings
        .iter()
        .any(|w| w == "Skipped song with empty ID"));
    assert!(result.errors.is_empty());
}

#[test]
fn test_parse_relinks_playlist_graph() {
    let converter = Converter::new().unwrap();
    let result = converter.parse(&create_kreate_backup()).unwrap();

    assert_eq!(result.playlists.len(), 1);
    let playlist = &result.playlists[0];
    assert_eq!(playlist.id, 7);
    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.browse_id, "VL123");
    assert!(playlist.selected);

    // members come back in position order; the dangling map row is dropped
    let ids: Vec<&str> = playlist.songs.iter().map(|s| s.song_id.as_str()).collect();
    assert_eq!(ids, ["s2", "s3", "s1"]);
}

#[test]
fn test_parse_profiles_source_tables() {
    let converter = Converter::new().unwrap();
    let result = converter.parse(&create_kreate_backup()).unwrap();

    let song = result
        .table_info
        .iter()
        .find(|t| t.name == "Song")
        .unwrap();
    assert_eq!(song.row_count, 4);
    assert_eq!(song.columns.len(), 7);
    assert!(song.sample_rows.len() <= 3);
    assert!(result
        .table_info
        .iter()
        .any(|t| t.name == "SongPlaylistMap"));
}

#[test]
fn test_generate_sqlite_round_trip() {
    let converter = Converter::new().unwrap();
    let result = converter.parse(&create_kreate_backup()).unwrap();

    let image = converter.generate_sqlite(&result, None).unwrap();
    assert_eq!(detect_format(&image), SourceFormat::Sqlite);

    let (_guard, conn) = reopen_image(&image);
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 23);

    // the image carries exactly the fixed schema objects, by name and kind
    let mut objects: Vec<(String, String)> = conn
        .prepare(
            "SELECT type, name FROM sqlite_master \
             WHERE type IN ('table', 'index', 'view') AND name NOT LIKE 'sqlite_%'",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    objects.sort();

    let mut expected: Vec<(String, String)> = Vec::new();
    for table in TARGET_SCHEMA.tables {
        expected.push(("table".to_string(), table.name.to_string()));
    }
    // bookkeeping tables live outside the schema constant
    expected.push(("table".to_string(), "room_master_table".to_string()));
    expected.push(("table".to_string(), "android_metadata".to_string()));
    for index in TARGET_SCHEMA.indexes {
        expected.push(("index".to_string(), index.name.to_string()));
    }
    for view in TARGET_SCHEMA.views {
        expected.push(("view".to_string(), view.name.to_string()));
    }
    expected.sort();
    assert_eq!(objects, expected);

    let identity: String = conn
        .query_row(
            "SELECT identity_hash FROM room_master_table WHERE id = 42",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(identity, "205c24811149a247279bcbfdc2d6c396");

    let locale: String = conn
        .query_row("SELECT locale FROM android_metadata", [], |row| row.get(0))
        .unwrap();
    assert_eq!(locale, "en_US");

    let songs: i64 = conn
        .query_row("SELECT COUNT(*) FROM Song", [], |row| row.get(0))
        .unwrap();
    assert_eq!(songs, 3);

    let duration: String = conn
        .query_row("SELECT durationText FROM Song WHERE id = 's1'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(duration, "3:45");

    // map rows are renumbered against the regenerated playlist id
    let rows: Vec<(String, i64, i64)> = conn
        .prepare("SELECT songId, playlistId, position FROM SongPlaylistMap ORDER BY position")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("s2".to_string(), 1, 0),
            ("s3".to_string(), 1, 1),
            ("s1".to_string(), 1, 2),
        ]
    );

    let view: i64 = conn
        .query_row("SELECT COUNT(*) FROM SortedSongPlaylistMap", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(view, 3);
}

#[test]
fn test_generate_sqlite_empty_selection_keeps_songs() {
    let converter = Converter::new().unwrap();
    let result = converter.parse(&create_kreate_backup()).unwrap();

    let image = converter.generate_sqlite(&result, Some(&[])).unwrap();
    let (_guard, conn) = reopen_image(&image);

    let songs: i64 = conn
        .query_row("SELECT COUNT(*) FROM Song", [], |row| row.get(0))
        .unwrap();
    assert_eq!(songs, 3);
    let playlists: i64 = conn
        .query_row("SELECT COUNT(*) FROM Playlist", [], |row| row.get(0))
        .unwrap();
    assert_eq!(playlists, 0);
    let maps: i64 = conn
        .query_row("SELECT COUNT(*) FROM SongPlaylistMap", [], |row| row.get(0))
        .unwrap();
    assert_eq!(maps, 0);
}

#[test]
fn test_csv_round_trip_is_stable() {
    let converter = Converter::new().unwrap();
    let parsed = converter.parse(&create_kreate_backup()).unwrap();

    let csv = converter.generate_csv(&parsed, None);
    let reparsed = converter.parse_csv(&csv);

    assert_eq!(reparsed.songs.len(), 3);
    assert_eq!(reparsed.playlists.len(), 1);
    assert_eq!(reparsed.playlists[0].name, "Road Trip");
    assert_eq!(reparsed.playlists[0].songs.len(), 3);

    // exported values are already canonical, so nothing needs repair
    assert!(reparsed.cleaning_report.is_empty());
    assert!(reparsed.errors.is_empty());
}

#[test]
fn test_corrupt_sqlite_reports_error() {
    let converter = Converter::new().unwrap();

    // valid 16-byte magic, garbage after it
    let result = converter.parse(b"SQLite format 3\0 but actually not").unwrap();
    assert!(result.songs.is_empty());
    assert!(result
        .errors
        .iter()
        .any(|e| e.starts_with("Database parsing error:")));
}

#[test]
fn test_unknown_bytes_are_rejected() {
    let converter = Converter::new().unwrap();
    let err = converter.parse(&[0u8; 32]).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFormat { .. }));
}
