//! # Metadata Store
//!
//! Read-only access to a MusicCabinet library exported to SQLite. The core
//! only sees the [`MetadataStore`] trait; [`SqliteStore`] is the production
//! implementation.
//!
//! Artist and tag searches use `REGEXP`, which SQLite leaves undefined. It is
//! registered on every connection and backed by the `regex` crate, with the
//! compiled pattern cached per statement.
//!
//! ## Schema
//!
//! ```text
//! artist(id, artist_name, artist_name_capitalization)
//! library_artist(artist_id)
//! album(id, album_name_capitalization)
//! track(id, artist_id, track_name_capitalization)
//! library_directory(id, path)
//! library_file(id, directory_id, filename)
//! library_track(id, track_id, album_id, file_id)
//! artist_top_track_play_count(artist_id, track_id, rank, play_count)
//! artist_relation(source_id, target_id, weight)
//! tag(id, tag_name)
//! artist_top_tag(artist_id, tag_id, tag_count)
//! ```

use crate::track::{Artist, ArtistId, TrackCandidate};
use anyhow::{bail, Context, Result};
use log::debug;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row};
use std::path::Path;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Narrow query contract the resolver and ranking engine depend on.
///
/// Patterns are passed through as regular expressions; callers add flags
/// such as `(?i)` themselves.
pub trait MetadataStore {
    /// Library artists whose indexed name matches `pattern`, as `(name, id)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex or the query fails.
    fn search_artists(&self, pattern: &str) -> Result<Vec<Artist>>;

    /// The artists' own top tracks, best popularity rank first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn top_tracks(&self, artist_ids: &[ArtistId], limit: usize) -> Result<Vec<TrackCandidate>>;

    /// Top tracks of every relation target of `seed`, plus the seed itself
    /// with weight 1. Unranked.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn related_pool(&self, seed: ArtistId) -> Result<Vec<TrackCandidate>>;

    /// Tag names matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regex or the query fails.
    fn search_tags(&self, pattern: &str) -> Result<Vec<String>>;

    /// Top tracks of every artist with a nonzero summed tag count over
    /// `tags`, weighted by that sum. Unranked.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn tagged_pool(&self, tags: &[String]) -> Result<Vec<TrackCandidate>>;
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS artist (
    id                          INTEGER PRIMARY KEY,
    artist_name                 TEXT    NOT NULL,
    artist_name_capitalization  TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS library_artist (
    artist_id   INTEGER PRIMARY KEY REFERENCES artist(id)
);
CREATE TABLE IF NOT EXISTS album (
    id                          INTEGER PRIMARY KEY,
    album_name_capitalization   TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS track (
    id                          INTEGER PRIMARY KEY,
    artist_id                   INTEGER NOT NULL REFERENCES artist(id),
    track_name_capitalization   TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS library_directory (
    id      INTEGER PRIMARY KEY,
    path    TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS library_file (
    id              INTEGER PRIMARY KEY,
    directory_id    INTEGER NOT NULL REFERENCES library_directory(id),
    filename        TEXT    NOT NULL
);
CREATE TABLE IF NOT EXISTS library_track (
    id          INTEGER PRIMARY KEY,
    track_id    INTEGER NOT NULL REFERENCES track(id),
    album_id    INTEGER NOT NULL REFERENCES album(id),
    file_id     INTEGER NOT NULL REFERENCES library_file(id)
);
CREATE TABLE IF NOT EXISTS artist_top_track_play_count (
    artist_id   INTEGER NOT NULL REFERENCES artist(id),
    track_id    INTEGER NOT NULL REFERENCES library_track(id),
    rank        INTEGER NOT NULL,
    play_count  INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS artist_relation (
    source_id   INTEGER NOT NULL REFERENCES artist(id),
    target_id   INTEGER NOT NULL REFERENCES artist(id),
    weight      REAL    NOT NULL
);
CREATE TABLE IF NOT EXISTS tag (
    id          INTEGER PRIMARY KEY,
    tag_name    TEXT    NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS artist_top_tag (
    artist_id   INTEGER NOT NULL REFERENCES artist(id),
    tag_id      INTEGER NOT NULL REFERENCES tag(id),
    tag_count   INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_attpc_artist ON artist_top_track_play_count(artist_id, rank);
CREATE INDEX IF NOT EXISTS idx_relation_source ON artist_relation(source_id);
CREATE INDEX IF NOT EXISTS idx_top_tag_tag ON artist_top_tag(tag_id);
";

/// Everything after `SELECT att.artist_id, <weight>, att.rank, att.play_count, `.
const TRACK_COLUMNS: &str = "ma.artist_name_capitalization,
       al.album_name_capitalization,
       mt.track_name_capitalization,
       d.path,
       f.filename";

const TRACK_JOINS: &str = "INNER JOIN library_track lt ON lt.id = att.track_id
INNER JOIN track mt ON mt.id = lt.track_id
INNER JOIN artist ma ON ma.id = mt.artist_id
INNER JOIN album al ON al.id = lt.album_id
INNER JOIN library_file f ON f.id = lt.file_id
INNER JOIN library_directory d ON d.id = f.directory_id";

/// Creates the library tables on a writable connection. Idempotent.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Invalid SQL when CREATEing the library schema")?;
    Ok(())
}

/// SQLite-backed [`MetadataStore`].
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens an existing library database read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Library database not found at {}. Pass --db or set db_path in the config file.",
                path.display()
            );
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open library database at {}", path.display()))?;

        debug!("Opened library database {}", path.display());
        Self::from_connection(conn)
    }

    /// Wraps an already open connection, e.g. an in-memory one.
    ///
    /// # Errors
    ///
    /// Returns an error if `REGEXP` cannot be registered.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        register_regexp(&conn)?;
        Ok(Self { conn })
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn candidates(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<TrackCandidate>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Invalid SQL statement:\n{sql}"))?;

        let rows = stmt
            .query_map(params, candidate_from_row)
            .context("Cannot query tracks")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read track rows")?;

        Ok(rows)
    }
}

/// Rows are `(artist_id, weight, rank, play_count, artist, album, track, path, filename)`.
fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<TrackCandidate> {
    Ok(TrackCandidate {
        artist_id: row.get(0)?,
        artist_weight: row.get(1)?,
        popularity_rank: row.get(2)?,
        play_count: row.get(3)?,
        artist_name: row.get(4)?,
        album_name: row.get(5)?,
        track_name: row.get(6)?,
        directory_path: row.get(7)?,
        filename: row.get(8)?,
        rank_within_artist: 0,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// `text REGEXP pattern` calls `regexp(pattern, text)`. NULL text never matches.
fn register_regexp(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regexp: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;

            match ctx.get_raw(1) {
                ValueRef::Null => Ok(false),
                value => {
                    let text = value
                        .as_str()
                        .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
                    Ok(regexp.is_match(text))
                }
            }
        },
    )
    .context("Failed to register REGEXP function on library connection")?;

    Ok(())
}

impl MetadataStore for SqliteStore {
    fn search_artists(&self, pattern: &str) -> Result<Vec<Artist>> {
        let mut stmt = self.conn.prepare(
            "SELECT ma.artist_name_capitalization, ma.id
             FROM artist ma
             INNER JOIN library_artist la ON ma.id = la.artist_id
             WHERE ma.artist_name REGEXP ?1
             ORDER BY ma.id",
        )?;

        let artists = stmt
            .query_map([pattern], |row| {
                Ok(Artist {
                    name: row.get(0)?,
                    id: row.get(1)?,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .with_context(|| format!("Artist search failed for pattern /{pattern}/"))?;

        debug!("{} artists match /{pattern}/", artists.len());
        Ok(artists)
    }

    fn top_tracks(&self, artist_ids: &[ArtistId], limit: usize) -> Result<Vec<TrackCandidate>> {
        if artist_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT att.artist_id, 1.0, att.rank, att.play_count,
       {TRACK_COLUMNS}
FROM artist_top_track_play_count att
{TRACK_JOINS}
WHERE att.artist_id IN ({})
ORDER BY att.rank ASC, att.artist_id ASC
LIMIT ?",
            placeholders(artist_ids.len())
        );

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let params = artist_ids.iter().copied().chain(std::iter::once(limit));

        let mut tracks = self.candidates(&sql, params_from_iter(params))?;
        for track in &mut tracks {
            track.rank_within_artist = track.popularity_rank;
        }
        Ok(tracks)
    }

    fn related_pool(&self, seed: ArtistId) -> Result<Vec<TrackCandidate>> {
        let sql = format!(
            "SELECT att.artist_id, ar.weight, att.rank, att.play_count,
       {TRACK_COLUMNS}
FROM artist_top_track_play_count att
INNER JOIN (SELECT source_id, target_id, weight FROM artist_relation
            UNION ALL SELECT ?1, ?1, 1.0) ar
        ON ar.target_id = att.artist_id AND ar.source_id = ?1
{TRACK_JOINS}
ORDER BY att.artist_id ASC, att.rank ASC"
        );

        let pool = self.candidates(&sql, [seed])?;
        debug!("Related pool for artist {seed}: {} tracks", pool.len());
        Ok(pool)
    }

    fn search_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag_name FROM tag WHERE tag_name REGEXP ?1 ORDER BY tag_name")?;

        let tags = stmt
            .query_map([pattern], |row| row.get(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<String>>>())
            .with_context(|| format!("Tag search failed for pattern /{pattern}/"))?;

        debug!("{} tags match /{pattern}/", tags.len());
        Ok(tags)
    }

    fn tagged_pool(&self, tags: &[String]) -> Result<Vec<TrackCandidate>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT att.artist_id, weighted.tag_count, att.rank, att.play_count,
       {TRACK_COLUMNS}
FROM artist_top_track_play_count att
INNER JOIN (SELECT toptag.artist_id, SUM(toptag.tag_count) AS tag_count
            FROM artist_top_tag toptag
            INNER JOIN tag ON toptag.tag_id = tag.id
            WHERE tag.tag_name IN ({})
            GROUP BY toptag.artist_id
            HAVING SUM(toptag.tag_count) > 0) weighted
        ON weighted.artist_id = att.artist_id
{TRACK_JOINS}
ORDER BY att.artist_id ASC, att.rank ASC",
            placeholders(tags.len())
        );

        let pool = self.candidates(&sql, params_from_iter(tags.iter()))?;
        debug!("Tagged pool for {} tags: {} tracks", tags.len(), pool.len());
        Ok(pool)
    }
}
