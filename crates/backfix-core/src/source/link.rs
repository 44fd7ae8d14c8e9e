//! Relationship linking: rebuild the song/playlist graph by value and
//! drop association rows whose endpoints did not survive extraction.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::sanitize::value;
use crate::source::columns::{self, lowercased, resolve};
use crate::source::database::SourceDatabase;
use crate::source::extract::{cell, integer_cell};
use crate::types::{ConversionResult, Song};

/// Resolve playlist membership from the mapping table.
///
/// Matching is by value: a mapping row only counts when its sanitized song
/// id names a song that survived extraction. Source rowids mean nothing
/// here, since the generator renumbers playlists anyway.
pub fn link_songs_to_playlists(db: &SourceDatabase, table: &str, result: &mut ConversionResult) {
    let data = match db.read_table(table) {
        Ok(data) => data,
        Err(e) => {
            result
                .errors
                .push(format!("Error linking songs to playlists: {e}"));
            return;
        }
    };
    let columns = lowercased(&data.columns);
    let playlist_idx = resolve(&columns, columns::mapping::PLAYLIST_ID);
    let song_idx = resolve(&columns, columns::mapping::SONG_ID);
    let position_idx = resolve(&columns, columns::mapping::POSITION);
    let (Some(playlist_idx), Some(song_idx)) = (playlist_idx, song_idx) else {
        result
            .warnings
            .push("Could not find playlist-song mapping columns".to_string());
        return;
    };

    // playlist id -> ordered (song snapshot, position) pairs
    let mut groups: HashMap<i64, Vec<(Song, i64)>> = HashMap::new();
    {
        let song_lookup: HashMap<&str, &Song> = result
            .songs
            .iter()
            .map(|song| (song.song_id.as_str(), song))
            .collect();

        for row in &data.rows {
            let cells = match row {
                Ok(cells) => cells,
                Err(e) => {
                    result
                        .errors
                        .push(format!("Error linking songs to playlists: {e}"));
                    return;
                }
            };
            let song_id = value::clean(
                cell(cells, Some(song_idx)),
                "mappingSongId",
                &mut result.cleaning_report,
            );
            let Some(playlist_id) = integer_cell(cells, Some(playlist_idx)) else {
                continue;
            };
            let position = integer_cell(cells, position_idx).unwrap_or(0);
            if let Some(song) = song_lookup.get(song_id.as_str()) {
                groups
                    .entry(playlist_id)
                    .or_default()
                    .push(((*song).clone(), position));
            }
        }
    }

    let linked: usize = groups.values().map(|g| g.len()).sum();
    for playlist in &mut result.playlists {
        if let Some(group) = groups.get(&playlist.id) {
            let mut ordered = group.clone();
            // stable: equal positions keep mapping-row order
            ordered.sort_by_key(|(_, position)| *position);
            playlist.songs = ordered.into_iter().map(|(song, _)| song).collect();
        }
    }
    debug!(table, linked, playlists = result.playlists.len(), "linked playlists");
}

/// Drop association and per-song rows whose keys no longer resolve.
///
/// Runs after all extraction so the generated database can never violate
/// its own foreign keys. Drops are silent: the rows were either already
/// warned about at extraction, or they reference ids the source itself had
/// abandoned.
pub fn prune_unresolved(result: &mut ConversionResult) {
    let song_ids: HashSet<&str> = result.songs.iter().map(|s| s.song_id.as_str()).collect();
    let album_ids: HashSet<&str> = result.albums.iter().map(|a| a.id.as_str()).collect();
    let artist_ids: HashSet<&str> = result.artists.iter().map(|a| a.id.as_str()).collect();

    result
        .song_album_maps
        .retain(|m| song_ids.contains(m.song_id.as_str()) && album_ids.contains(m.album_id.as_str()));
    result
        .song_artist_maps
        .retain(|m| song_ids.contains(m.song_id.as_str()) && artist_ids.contains(m.artist_id.as_str()));
    result.events.retain(|e| song_ids.contains(e.song_id.as_str()));
    result.formats.retain(|f| song_ids.contains(f.song_id.as_str()));
    result.lyrics.retain(|l| song_ids.contains(l.song_id.as_str()));
}
