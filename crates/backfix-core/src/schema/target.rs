//! The fixed Cubic Music schema, expressed as data.
//!
//! The generator renders its DDL from this single constant and the
//! conversion report describes the target from the same constant, so the
//! two can never drift apart. Statement text matches what the target
//! application's ORM emits, down to the backtick quoting, because the app
//! validates its database against an identity hash of the schema.

use serde::Serialize;

/// The complete schema the generator emits.
pub struct TargetSchema {
    /// `PRAGMA user_version` stamp the target app checks before migrating.
    pub version: i64,
    /// Schema identity hash stored in `room_master_table`.
    pub identity_hash: &'static str,
    /// Locale row stored in `android_metadata`.
    pub locale: &'static str,
    pub tables: &'static [TableDef],
    pub indexes: &'static [IndexDef],
    pub views: &'static [ViewDef],
}

pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Composite/trailing primary key columns; empty when a column is the
    /// inline autoincrement key.
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeyDef],
}

pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
    pub auto_increment: bool,
}

pub struct ForeignKeyDef {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
}

pub struct IndexDef {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

pub struct ViewDef {
    pub name: &'static str,
    pub select: &'static str,
}

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str) -> Self {
        ColumnDef {
            name,
            sql_type,
            not_null: false,
            auto_increment: false,
        }
    }

    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.not_null = true;
        self
    }
}

const fn fk(column: &'static str, parent_table: &'static str, parent_column: &'static str) -> ForeignKeyDef {
    ForeignKeyDef {
        column,
        parent_table,
        parent_column,
    }
}

/// The schema Cubic Music 0.x expects, Room schema version 23.
pub const TARGET_SCHEMA: TargetSchema = TargetSchema {
    version: 23,
    identity_hash: "205c24811149a247279bcbfdc2d6c396",
    locale: "en_US",
    tables: &[
        TableDef {
            name: "Song",
            columns: &[
                ColumnDef::new("id", "TEXT").not_null(),
                ColumnDef::new("title", "TEXT").not_null(),
                ColumnDef::new("artistsText", "TEXT"),
                ColumnDef::new("durationText", "TEXT"),
                ColumnDef::new("thumbnailUrl", "TEXT"),
                ColumnDef::new("likedAt", "INTEGER"),
                ColumnDef::new("totalPlayTimeMs", "INTEGER").not_null(),
            ],
            primary_key: &["id"],
            foreign_keys: &[],
        },
        TableDef {
            name: "Playlist",
            columns: &[
                ColumnDef::new("id", "INTEGER").auto_increment(),
                ColumnDef::new("name", "TEXT").not_null(),
                ColumnDef::new("browseId", "TEXT"),
            ],
            primary_key: &[],
            foreign_keys: &[],
        },
        TableDef {
            name: "SongPlaylistMap",
            columns: &[
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("playlistId", "INTEGER").not_null(),
                ColumnDef::new("position", "INTEGER").not_null(),
            ],
            primary_key: &["songId", "playlistId"],
            foreign_keys: &[fk("songId", "Song", "id"), fk("playlistId", "Playlist", "id")],
        },
        TableDef {
            name: "Artist",
            columns: &[
                ColumnDef::new("id", "TEXT").not_null(),
                ColumnDef::new("name", "TEXT"),
                ColumnDef::new("thumbnailUrl", "TEXT"),
                ColumnDef::new("timestamp", "INTEGER"),
                ColumnDef::new("bookmarkedAt", "INTEGER"),
            ],
            primary_key: &["id"],
            foreign_keys: &[],
        },
        TableDef {
            name: "SongArtistMap",
            columns: &[
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("artistId", "TEXT").not_null(),
            ],
            primary_key: &["songId", "artistId"],
            foreign_keys: &[fk("songId", "Song", "id"), fk("artistId", "Artist", "id")],
        },
        TableDef {
            name: "Album",
            columns: &[
                ColumnDef::new("id", "TEXT").not_null(),
                ColumnDef::new("title", "TEXT"),
                ColumnDef::new("thumbnailUrl", "TEXT"),
                ColumnDef::new("year", "TEXT"),
                ColumnDef::new("authorsText", "TEXT"),
                ColumnDef::new("shareUrl", "TEXT"),
                ColumnDef::new("timestamp", "INTEGER"),
                ColumnDef::new("bookmarkedAt", "INTEGER"),
            ],
            primary_key: &["id"],
            foreign_keys: &[],
        },
        TableDef {
            name: "SongAlbumMap",
            columns: &[
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("albumId", "TEXT").not_null(),
                ColumnDef::new("position", "INTEGER"),
            ],
            primary_key: &["songId", "albumId"],
            foreign_keys: &[fk("songId", "Song", "id"), fk("albumId", "Album", "id")],
        },
        TableDef {
            name: "SearchQuery",
            columns: &[
                ColumnDef::new("id", "INTEGER").auto_increment(),
                ColumnDef::new("query", "TEXT").not_null(),
            ],
            primary_key: &[],
            foreign_keys: &[],
        },
        TableDef {
            name: "QueuedMediaItem",
            columns: &[
                ColumnDef::new("id", "INTEGER").auto_increment(),
                ColumnDef::new("mediaItem", "BLOB").not_null(),
                ColumnDef::new("position", "INTEGER"),
            ],
            primary_key: &[],
            foreign_keys: &[],
        },
        TableDef {
            name: "Format",
            columns: &[
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("itag", "INTEGER"),
                ColumnDef::new("mimeType", "TEXT"),
                ColumnDef::new("bitrate", "INTEGER"),
                ColumnDef::new("contentLength", "INTEGER"),
                ColumnDef::new("lastModified", "INTEGER"),
                ColumnDef::new("loudnessDb", "REAL"),
            ],
            primary_key: &["songId"],
            foreign_keys: &[fk("songId", "Song", "id")],
        },
        TableDef {
            name: "Event",
            columns: &[
                ColumnDef::new("id", "INTEGER").auto_increment(),
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("timestamp", "INTEGER").not_null(),
                ColumnDef::new("playTime", "INTEGER").not_null(),
            ],
            primary_key: &[],
            foreign_keys: &[fk("songId", "Song", "id")],
        },
        TableDef {
            name: "Lyrics",
            columns: &[
                ColumnDef::new("songId", "TEXT").not_null(),
                ColumnDef::new("fixed", "TEXT"),
                ColumnDef::new("synced", "TEXT"),
            ],
            primary_key: &["songId"],
            foreign_keys: &[fk("songId", "Song", "id")],
        },
    ],
    indexes: &[
        IndexDef {
            name: "index_SongPlaylistMap_songId",
            table: "SongPlaylistMap",
            columns: &["songId"],
            unique: false,
        },
        IndexDef {
            name: "index_SongPlaylistMap_playlistId",
            table: "SongPlaylistMap",
            columns: &["playlistId"],
            unique: false,
        },
        IndexDef {
            name: "index_SongArtistMap_songId",
            table: "SongArtistMap",
            columns: &["songId"],
            unique: false,
        },
        IndexDef {
            name: "index_SongArtistMap_artistId",
            table: "SongArtistMap",
            columns: &["artistId"],
            unique: false,
        },
        IndexDef {
            name: "index_SongAlbumMap_songId",
            table: "SongAlbumMap",
            columns: &["songId"],
            unique: false,
        },
        IndexDef {
            name: "index_SongAlbumMap_albumId",
            table: "SongAlbumMap",
            columns: &["albumId"],
            unique: false,
        },
        IndexDef {
            name: "index_SearchQuery_query",
            table: "SearchQuery",
            columns: &["query"],
            unique: true,
        },
        IndexDef {
            name: "index_Event_songId",
            table: "Event",
            columns: &["songId"],
            unique: false,
        },
    ],
    views: &[ViewDef {
        name: "SortedSongPlaylistMap",
        select: "SELECT * FROM SongPlaylistMap ORDER BY position",
    }],
};

impl TableDef {
    /// Render the CREATE TABLE statement in the exact form the target
    /// application's ORM emits.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.columns.len() + 2);
        for column in self.columns {
            let mut def = format!("`{}` {}", column.name, column.sql_type);
            if column.auto_increment {
                def.push_str(" PRIMARY KEY AUTOINCREMENT");
            }
            if column.not_null {
                def.push_str(" NOT NULL");
            }
            parts.push(def);
        }
        if !self.primary_key.is_empty() {
            let keys: Vec<String> = self.primary_key.iter().map(|c| format!("`{c}`")).collect();
            parts.push(format!("PRIMARY KEY({})", keys.join(", ")));
        }
        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY(`{}`) REFERENCES `{}`(`{}`) ON UPDATE NO ACTION ON DELETE CASCADE",
                fk.column, fk.parent_table, fk.parent_column
            ));
        }
        format!("CREATE TABLE `{}` ({})", self.name, parts.join(", "))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl IndexDef {
    pub fn create_sql(&self) -> String {
        let keyword = if self.unique { "CREATE UNIQUE INDEX" } else { "CREATE INDEX" };
        let columns: Vec<String> = self.columns.iter().map(|c| format!("`{c}`")).collect();
        format!(
            "{} `{}` ON `{}` ({})",
            keyword,
            self.name,
            self.table,
            columns.join(", ")
        )
    }
}

impl ViewDef {
    pub fn create_sql(&self) -> String {
        format!("CREATE VIEW `{}` AS {}", self.name, self.select)
    }
}

impl TargetSchema {
    /// All DDL statements in creation order: tables, indexes, views.
    pub fn ddl(&self) -> Vec<String> {
        let mut statements = Vec::new();
        for table in self.tables {
            statements.push(table.create_sql());
        }
        for index in self.indexes {
            statements.push(index.create_sql());
        }
        for view in self.views {
            statements.push(view.create_sql());
        }
        statements
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Serializable summary of the target schema, embedded in every
/// [`crate::types::ConversionResult`] so a UI can show what it will get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSchemaInfo {
    pub version: i64,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub name: String,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    pub not_null: bool,
}

impl TargetSchemaInfo {
    /// Summary of [`TARGET_SCHEMA`].
    pub fn current() -> Self {
        TargetSchemaInfo {
            version: TARGET_SCHEMA.version,
            tables: TARGET_SCHEMA
                .tables
                .iter()
                .map(|table| TableSummary {
                    name: table.name.to_string(),
                    columns: table
                        .columns
                        .iter()
                        .map(|column| ColumnSummary {
                            name: column.name.to_string(),
                            sql_type: column.sql_type.to_string(),
                            not_null: column.not_null,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
