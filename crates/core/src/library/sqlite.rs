//! SQLite-backed catalog replica.
//!
//! Upsert conflict policy is data, not code: one [`UpsertSpec`] per resource
//! kind names its conflict key and mutable columns, and a single generic
//! builder turns any spec into a multi-row `INSERT ... ON CONFLICT` statement.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{
    EpisodeRecord, LibraryError, LibraryStats, LibraryStore, ReleaseRecord, SeriesRecord,
    SeriesTagRecord, TagKind, TagRecord,
};

// SQLite caps the total variables per statement (SQLITE_MAX_VARIABLE_NUMBER);
// 90 rows keeps the widest insert comfortably under it.
const INSERT_CHUNK_SIZE: usize = 90;

/// One `ON CONFLICT` clause: the target columns and the columns updated from
/// the incoming row. An empty update list means `DO NOTHING`.
struct ConflictClause {
    target: &'static [&'static str],
    update: &'static [&'static str],
}

/// Per-kind upsert description.
struct UpsertSpec {
    table: &'static str,
    columns: &'static [&'static str],
    conflicts: &'static [ConflictClause],
}

const TAG_UPSERT: UpsertSpec = UpsertSpec {
    table: "tags",
    columns: &["id", "slug", "name", "kind"],
    conflicts: &[ConflictClause {
        target: &["id"],
        // Slugs are human-assigned and renamed upstream
        update: &["slug", "name", "kind"],
    }],
};

const SERIES_UPSERT: UpsertSpec = UpsertSpec {
    table: "series",
    columns: &[
        "id",
        "name",
        "sort_name",
        "slug",
        "overview",
        "network",
        "poster_url",
        "fanart_url",
        "popularity",
        "vote_average",
        "status",
        "language",
        "last_updated_on",
    ],
    conflicts: &[ConflictClause {
        target: &["id"],
        update: &[
            "name",
            "sort_name",
            "slug",
            "overview",
            "network",
            "poster_url",
            "fanart_url",
            "popularity",
            "vote_average",
            "status",
            "language",
            "last_updated_on",
        ],
    }],
};

const SERIES_TAG_UPSERT: UpsertSpec = UpsertSpec {
    table: "series_tags",
    columns: &["series_id", "tag_id"],
    conflicts: &[ConflictClause {
        target: &["series_id", "tag_id"],
        update: &[],
    }],
};

const EPISODE_UPSERT: UpsertSpec = UpsertSpec {
    table: "episodes",
    columns: &[
        "remote_id",
        "series_id",
        "season",
        "number",
        "name",
        "overview",
        "aired_on",
        "thumbnail_url",
        "last_updated_on",
    ],
    conflicts: &[
        // Remote episode ids get reassigned upstream; (series, season, number)
        // identifies the row and the stored remote id follows the payload
        ConflictClause {
            target: &["series_id", "season", "number"],
            update: &[
                "remote_id",
                "name",
                "overview",
                "aired_on",
                "thumbnail_url",
                "last_updated_on",
            ],
        },
        // Same remote id moved to a new slot (upstream renumbering)
        ConflictClause {
            target: &["remote_id"],
            update: &[
                "series_id",
                "season",
                "number",
                "name",
                "overview",
                "aired_on",
                "thumbnail_url",
                "last_updated_on",
            ],
        },
    ],
};

const RELEASE_UPSERT: UpsertSpec = UpsertSpec {
    table: "releases",
    columns: &[
        "info_hash",
        "episode_remote_id",
        "name",
        "size",
        "magnet_uri",
        "seeders",
        "leechers",
        "completed",
        "resolution",
        "added_on",
        "last_updated_on",
    ],
    conflicts: &[ConflictClause {
        target: &["info_hash"],
        // Swarm counters are the only thing that moves for a known release
        update: &["seeders", "leechers", "completed", "last_updated_on"],
    }],
};

/// A record that can be written through the generic upsert path.
trait UpsertRow {
    fn spec() -> &'static UpsertSpec;

    /// Append this row's column values, in `spec().columns` order.
    fn push_values(&self, out: &mut Vec<Value>);
}

impl UpsertRow for TagRecord {
    fn spec() -> &'static UpsertSpec {
        &TAG_UPSERT
    }

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::Integer(self.id));
        out.push(Value::Text(self.slug.clone()));
        out.push(Value::Text(self.name.clone()));
        out.push(Value::Text(self.kind.as_code().to_string()));
    }
}

impl UpsertRow for SeriesRecord {
    fn spec() -> &'static UpsertSpec {
        &SERIES_UPSERT
    }

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::Integer(self.id));
        out.push(Value::Text(self.name.clone()));
        out.push(Value::Text(self.sort_name.clone()));
        out.push(Value::Text(self.slug.clone()));
        out.push(Value::Text(self.overview.clone()));
        out.push(Value::Text(self.network.clone()));
        out.push(Value::Text(self.poster_url.clone()));
        out.push(Value::Text(self.fanart_url.clone()));
        out.push(Value::Real(self.popularity));
        out.push(Value::Real(self.vote_average));
        out.push(Value::Text(self.status.clone()));
        out.push(Value::Text(self.language.clone()));
        out.push(Value::Text(self.last_updated_on.to_rfc3339()));
    }
}

impl UpsertRow for SeriesTagRecord {
    fn spec() -> &'static UpsertSpec {
        &SERIES_TAG_UPSERT
    }

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::Integer(self.series_id));
        out.push(Value::Integer(self.tag_id));
    }
}

impl UpsertRow for EpisodeRecord {
    fn spec() -> &'static UpsertSpec {
        &EPISODE_UPSERT
    }

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::Integer(self.remote_id));
        out.push(Value::Integer(self.series_id));
        out.push(Value::Integer(self.season as i64));
        out.push(Value::Integer(self.number as i64));
        out.push(Value::Text(self.name.clone()));
        out.push(Value::Text(self.overview.clone()));
        out.push(match self.aired_on {
            Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        });
        out.push(Value::Text(self.thumbnail_url.clone()));
        out.push(Value::Text(self.last_updated_on.to_rfc3339()));
    }
}

impl UpsertRow for ReleaseRecord {
    fn spec() -> &'static UpsertSpec {
        &RELEASE_UPSERT
    }

    fn push_values(&self, out: &mut Vec<Value>) {
        out.push(Value::Text(self.info_hash.to_lowercase()));
        out.push(Value::Integer(self.episode_remote_id));
        out.push(Value::Text(self.name.clone()));
        out.push(Value::Integer(self.size as i64));
        out.push(Value::Text(self.magnet_uri.clone()));
        out.push(Value::Integer(self.seeders as i64));
        out.push(Value::Integer(self.leechers as i64));
        out.push(Value::Integer(self.completed as i64));
        out.push(Value::Integer(self.resolution as i64));
        out.push(Value::Text(self.added_on.to_rfc3339()));
        out.push(Value::Text(self.last_updated_on.to_rfc3339()));
    }
}

fn build_upsert_sql(spec: &UpsertSpec, rows: usize) -> String {
    let row_placeholders = format!("({})", vec!["?"; spec.columns.len()].join(", "));
    let values = vec![row_placeholders; rows].join(", ");

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        spec.table,
        spec.columns.join(", "),
        values
    );

    for clause in spec.conflicts {
        sql.push_str(&format!(" ON CONFLICT({})", clause.target.join(", ")));
        if clause.update.is_empty() {
            sql.push_str(" DO NOTHING");
        } else {
            let assignments = clause
                .update
                .iter()
                .map(|column| format!("{column} = excluded.{column}"))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" DO UPDATE SET {assignments}"));
        }
    }

    sql
}

/// SQLite-backed catalog replica.
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Open (or create) the library at the given path.
    pub fn new(path: &Path) -> Result<Self, LibraryError> {
        let conn = Connection::open(path).map_err(|e| LibraryError::Database(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode = wal;")
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory library (useful for testing).
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| LibraryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LibraryError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS series (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                sort_name TEXT NOT NULL DEFAULT '',
                slug TEXT NOT NULL DEFAULT '',
                overview TEXT NOT NULL DEFAULT '',
                network TEXT NOT NULL DEFAULT '',
                poster_url TEXT NOT NULL DEFAULT '',
                fanart_url TEXT NOT NULL DEFAULT '',
                popularity REAL NOT NULL DEFAULT 0,
                vote_average REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT '',
                last_updated_on TEXT NOT NULL
            );

            CREATE VIRTUAL TABLE IF NOT EXISTS series_fts USING fts5(name);

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY,
                slug TEXT NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL DEFAULT 'G'
            );

            CREATE TABLE IF NOT EXISTS series_tags (
                series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (series_id, tag_id)
            );

            CREATE TABLE IF NOT EXISTS episodes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                remote_id INTEGER NOT NULL UNIQUE,
                series_id INTEGER NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                season INTEGER NOT NULL,
                number INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                overview TEXT NOT NULL DEFAULT '',
                aired_on TEXT,
                thumbnail_url TEXT NOT NULL DEFAULT '',
                last_updated_on TEXT NOT NULL,
                UNIQUE (series_id, season, number)
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_series ON episodes(series_id);

            CREATE TABLE IF NOT EXISTS releases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                info_hash TEXT NOT NULL UNIQUE,
                episode_remote_id INTEGER NOT NULL
                    REFERENCES episodes(remote_id) ON UPDATE CASCADE ON DELETE CASCADE,
                name TEXT NOT NULL DEFAULT '',
                size INTEGER NOT NULL DEFAULT 0,
                magnet_uri TEXT NOT NULL DEFAULT '',
                seeders INTEGER NOT NULL DEFAULT 0,
                leechers INTEGER NOT NULL DEFAULT 0,
                completed INTEGER NOT NULL DEFAULT 0,
                resolution INTEGER NOT NULL DEFAULT 0,
                added_on TEXT NOT NULL,
                last_updated_on TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_releases_episode ON releases(episode_remote_id);
            "#,
        )
        .map_err(|e| LibraryError::Database(e.to_string()))?;

        Ok(())
    }

    /// Upsert rows in sub-batches inside one transaction, returning the
    /// number of rows inserted or updated.
    fn upsert_rows<R: UpsertRow>(&self, rows: &[R]) -> Result<u32, LibraryError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let mut merged = 0u32;
        for batch in rows.chunks(INSERT_CHUNK_SIZE) {
            let sql = build_upsert_sql(R::spec(), batch.len());
            let mut values: Vec<Value> = Vec::with_capacity(batch.len() * R::spec().columns.len());
            for row in batch {
                row.push_values(&mut values);
            }
            merged += tx
                .execute(&sql, params_from_iter(values))
                .map_err(|e| LibraryError::Database(e.to_string()))?
                as u32;
        }

        tx.commit()
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        Ok(merged)
    }

    fn row_to_series(row: &rusqlite::Row) -> rusqlite::Result<SeriesRecord> {
        let last_updated_str: String = row.get(12)?;
        Ok(SeriesRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            sort_name: row.get(2)?,
            slug: row.get(3)?,
            overview: row.get(4)?,
            network: row.get(5)?,
            poster_url: row.get(6)?,
            fanart_url: row.get(7)?,
            popularity: row.get(8)?,
            vote_average: row.get(9)?,
            status: row.get(10)?,
            language: row.get(11)?,
            last_updated_on: parse_timestamp(&last_updated_str),
        })
    }

    fn row_to_episode(row: &rusqlite::Row) -> rusqlite::Result<EpisodeRecord> {
        let aired_on_str: Option<String> = row.get(7)?;
        let last_updated_str: String = row.get(9)?;
        Ok(EpisodeRecord {
            id: row.get(0)?,
            remote_id: row.get(1)?,
            series_id: row.get(2)?,
            season: row.get::<_, i64>(3)? as u32,
            number: row.get::<_, i64>(4)? as u32,
            name: row.get(5)?,
            overview: row.get(6)?,
            aired_on: aired_on_str
                .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()),
            thumbnail_url: row.get(8)?,
            last_updated_on: parse_timestamp(&last_updated_str),
        })
    }

    fn count_table(conn: &Connection, table: &str) -> Result<u64, LibraryError> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .map_err(|e| LibraryError::Database(e.to_string()))
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

const SERIES_SELECT: &str = "SELECT id, name, sort_name, slug, overview, network, poster_url, \
                             fanart_url, popularity, vote_average, status, language, \
                             last_updated_on FROM series";

impl LibraryStore for SqliteLibrary {
    fn upsert_tags(&self, rows: &[TagRecord]) -> Result<u32, LibraryError> {
        self.upsert_rows(rows)
    }

    fn upsert_series(&self, rows: &[SeriesRecord]) -> Result<u32, LibraryError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let merged = self.upsert_rows(rows)?;

        // FTS5 cannot ride the multi-row upsert; names are replaced one by one
        let conn = self.conn.lock().unwrap();
        for row in rows {
            conn.execute(
                "INSERT OR REPLACE INTO series_fts (rowid, name) VALUES (?, ?)",
                params![row.id, row.name],
            )
            .map_err(|e| LibraryError::Database(e.to_string()))?;
        }
        conn.execute("INSERT INTO series_fts (series_fts) VALUES ('optimize')", [])
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        Ok(merged)
    }

    fn upsert_series_tags(&self, rows: &[SeriesTagRecord]) -> Result<u32, LibraryError> {
        self.upsert_rows(rows)
    }

    fn upsert_episodes(&self, rows: &[EpisodeRecord]) -> Result<u32, LibraryError> {
        self.upsert_rows(rows)
    }

    fn upsert_releases(&self, rows: &[ReleaseRecord]) -> Result<u32, LibraryError> {
        self.upsert_rows(rows)
    }

    fn get_series(&self, id: i64) -> Result<SeriesRecord, LibraryError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{SERIES_SELECT} WHERE id = ?"),
            params![id],
            Self::row_to_series,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => LibraryError::NotFound(format!("series {id}")),
            _ => LibraryError::Database(e.to_string()),
        })
    }

    fn get_episode(
        &self,
        series_id: i64,
        season: u32,
        number: u32,
    ) -> Result<EpisodeRecord, LibraryError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, remote_id, series_id, season, number, name, overview, aired_on, \
             thumbnail_url, last_updated_on FROM episodes \
             WHERE series_id = ? AND season = ? AND number = ?",
            params![series_id, season, number],
            Self::row_to_episode,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => LibraryError::NotFound(format!(
                "episode {series_id}/{season}x{number:02}"
            )),
            _ => LibraryError::Database(e.to_string()),
        })
    }

    fn search_series(&self, query: &str, limit: u32) -> Result<Vec<SeriesRecord>, LibraryError> {
        let conn = self.conn.lock().unwrap();

        // Quote the query so FTS5 operators in user input cannot break the MATCH
        let match_expr = format!("\"{}\"", query.replace('"', " "));

        let mut stmt = conn
            .prepare(&format!(
                "{SERIES_SELECT} WHERE id IN \
                 (SELECT rowid FROM series_fts WHERE series_fts MATCH ? ORDER BY rank LIMIT ?)"
            ))
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![match_expr, limit], Self::row_to_series)
            .map_err(|e| LibraryError::Database(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| LibraryError::Database(e.to_string()))?);
        }
        Ok(results)
    }

    fn stats(&self) -> Result<LibraryStats, LibraryError> {
        let conn = self.conn.lock().unwrap();
        Ok(LibraryStats {
            tags: Self::count_table(&conn, "tags")?,
            series: Self::count_table(&conn, "series")?,
            series_tags: Self::count_table(&conn, "series_tags")?,
            episodes: Self::count_table(&conn, "episodes")?,
            releases: Self::count_table(&conn, "releases")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_library() -> SqliteLibrary {
        SqliteLibrary::in_memory().unwrap()
    }

    fn tag(id: i64, slug: &str) -> TagRecord {
        TagRecord {
            id,
            slug: slug.to_string(),
            name: slug.to_string(),
            kind: TagKind::Genre,
        }
    }

    fn series(id: i64, name: &str) -> SeriesRecord {
        SeriesRecord {
            id,
            name: name.to_string(),
            sort_name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            overview: format!("All about {name}"),
            network: "HBO".to_string(),
            poster_url: String::new(),
            fanart_url: String::new(),
            popularity: 1.0,
            vote_average: 7.5,
            status: "C".to_string(),
            language: "en".to_string(),
            last_updated_on: Utc::now(),
        }
    }

    fn episode(remote_id: i64, series_id: i64, season: u32, number: u32) -> EpisodeRecord {
        EpisodeRecord {
            id: 0,
            remote_id,
            series_id,
            season,
            number,
            name: format!("Episode {number}"),
            overview: String::new(),
            aired_on: NaiveDate::from_ymd_opt(2024, 1, number % 28 + 1),
            thumbnail_url: String::new(),
            last_updated_on: Utc::now(),
        }
    }

    fn release(info_hash: &str, episode_remote_id: i64) -> ReleaseRecord {
        ReleaseRecord {
            id: 0,
            info_hash: info_hash.to_string(),
            episode_remote_id,
            name: format!("Show.S01E01.{info_hash}"),
            size: 1024 * 1024 * 700,
            magnet_uri: format!("magnet:?xt=urn:btih:{info_hash}"),
            seeders: 10,
            leechers: 2,
            completed: 100,
            resolution: 1080,
            added_on: Utc::now(),
            last_updated_on: Utc::now(),
        }
    }

    #[test]
    fn test_build_upsert_sql_single_clause() {
        let sql = build_upsert_sql(&TAG_UPSERT, 2);
        assert_eq!(
            sql,
            "INSERT INTO tags (id, slug, name, kind) VALUES (?, ?, ?, ?), (?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET slug = excluded.slug, name = excluded.name, \
             kind = excluded.kind"
        );
    }

    #[test]
    fn test_build_upsert_sql_do_nothing() {
        let sql = build_upsert_sql(&SERIES_TAG_UPSERT, 1);
        assert_eq!(
            sql,
            "INSERT INTO series_tags (series_id, tag_id) VALUES (?, ?) \
             ON CONFLICT(series_id, tag_id) DO NOTHING"
        );
    }

    #[test]
    fn test_upsert_series_inserts_and_updates() {
        let library = create_test_library();

        let merged = library.upsert_series(&[series(1, "Severance")]).unwrap();
        assert_eq!(merged, 1);

        // Same natural key again: update, not duplicate
        let mut changed = series(1, "Severance");
        changed.overview = "Work-life balance, surgically".to_string();
        let merged = library.upsert_series(&[changed]).unwrap();
        assert_eq!(merged, 1);

        let stats = library.stats().unwrap();
        assert_eq!(stats.series, 1);
        let stored = library.get_series(1).unwrap();
        assert_eq!(stored.overview, "Work-life balance, surgically");
    }

    #[test]
    fn test_upsert_tags_renamed_slug() {
        let library = create_test_library();
        library.upsert_tags(&[tag(1, "scifi")]).unwrap();

        let mut renamed = tag(1, "science-fiction");
        renamed.kind = TagKind::Keyword;
        library.upsert_tags(&[renamed]).unwrap();

        let stats = library.stats().unwrap();
        assert_eq!(stats.tags, 1);
    }

    #[test]
    fn test_upsert_episode_remote_id_reassigned() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        library.upsert_episodes(&[episode(100, 1, 1, 1)]).unwrap();

        // Upstream reassigned the remote id but kept (series, season, number)
        let merged = library.upsert_episodes(&[episode(200, 1, 1, 1)]).unwrap();
        assert_eq!(merged, 1);

        let stats = library.stats().unwrap();
        assert_eq!(stats.episodes, 1);

        let stored = library.get_episode(1, 1, 1).unwrap();
        assert_eq!(stored.remote_id, 200);
        assert_eq!(stored.season, 1);
        assert_eq!(stored.number, 1);
    }

    #[test]
    fn test_upsert_episode_keeps_local_id() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        library.upsert_episodes(&[episode(100, 1, 1, 1)]).unwrap();
        let before = library.get_episode(1, 1, 1).unwrap();

        library.upsert_episodes(&[episode(200, 1, 1, 1)]).unwrap();
        let after = library.get_episode(1, 1, 1).unwrap();

        assert_eq!(before.id, after.id);
        assert_ne!(before.remote_id, after.remote_id);
    }

    #[test]
    fn test_upsert_episode_renumbered_upstream() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        library.upsert_episodes(&[episode(100, 1, 1, 1)]).unwrap();

        // Same remote id, moved to a new slot
        library.upsert_episodes(&[episode(100, 1, 1, 2)]).unwrap();

        let stats = library.stats().unwrap();
        assert_eq!(stats.episodes, 1);
        let stored = library.get_episode(1, 1, 2).unwrap();
        assert_eq!(stored.remote_id, 100);
    }

    #[test]
    fn test_upsert_episode_unknown_series_fails() {
        let library = create_test_library();
        let result = library.upsert_episodes(&[episode(100, 99, 1, 1)]);
        assert!(matches!(result, Err(LibraryError::Database(_))));
    }

    #[test]
    fn test_upsert_releases_updates_counters_only() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        library.upsert_episodes(&[episode(100, 1, 1, 1)]).unwrap();
        library.upsert_releases(&[release("abc123", 100)]).unwrap();

        let mut updated = release("abc123", 100);
        updated.seeders = 99;
        updated.name = "Renamed.mkv".to_string();
        let merged = library.upsert_releases(&[updated]).unwrap();
        assert_eq!(merged, 1);

        let stats = library.stats().unwrap();
        assert_eq!(stats.releases, 1);

        let conn = library.conn.lock().unwrap();
        let (name, seeders): (String, u32) = conn
            .query_row(
                "SELECT name, seeders FROM releases WHERE info_hash = 'abc123'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        // Name is not in the mutable set; counters are
        assert_eq!(name, "Show.S01E01.abc123");
        assert_eq!(seeders, 99);
    }

    #[test]
    fn test_upsert_series_tags_is_idempotent() {
        let library = create_test_library();
        library.upsert_tags(&[tag(1, "drama")]).unwrap();
        library.upsert_series(&[series(1, "Dark")]).unwrap();

        let association = SeriesTagRecord {
            series_id: 1,
            tag_id: 1,
        };
        let merged = library.upsert_series_tags(&[association]).unwrap();
        assert_eq!(merged, 1);

        // DO NOTHING on the second pass
        let merged = library.upsert_series_tags(&[association]).unwrap();
        assert_eq!(merged, 0);

        let stats = library.stats().unwrap();
        assert_eq!(stats.series_tags, 1);
    }

    #[test]
    fn test_series_tags_cascade_with_series() {
        let library = create_test_library();
        library.upsert_tags(&[tag(1, "drama")]).unwrap();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        library
            .upsert_series_tags(&[SeriesTagRecord {
                series_id: 1,
                tag_id: 1,
            }])
            .unwrap();

        let conn = library.conn.lock().unwrap();
        conn.execute("DELETE FROM series WHERE id = 1", []).unwrap();
        let remaining: u64 = conn
            .query_row("SELECT COUNT(*) FROM series_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_upsert_batches_beyond_chunk_size() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();

        let episodes: Vec<EpisodeRecord> = (0..200i64)
            .map(|i| episode(1000 + i, 1, (i / 50 + 1) as u32, (i % 50 + 1) as u32))
            .collect();

        let merged = library.upsert_episodes(&episodes).unwrap();
        assert_eq!(merged, 200);
        assert_eq!(library.stats().unwrap().episodes, 200);
    }

    #[test]
    fn test_get_series_not_found() {
        let library = create_test_library();
        assert!(matches!(
            library.get_series(404),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_get_episode_not_found() {
        let library = create_test_library();
        assert!(matches!(
            library.get_episode(1, 1, 1),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_search_series_by_name() {
        let library = create_test_library();
        library
            .upsert_series(&[series(1, "The Expanse"), series(2, "Dark")])
            .unwrap();

        let results = library.search_series("expanse", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn test_search_series_tracks_renames() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Working Title")]).unwrap();
        library.upsert_series(&[series(1, "Final Title")]).unwrap();

        assert!(library.search_series("working", 10).unwrap().is_empty());
        assert_eq!(library.search_series("final", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_search_series_quotes_fts_operators() {
        let library = create_test_library();
        library.upsert_series(&[series(1, "Dark")]).unwrap();

        // Must not error out as an FTS5 syntax error
        let results = library.search_series("dark AND (", 10).unwrap();
        assert!(results.len() <= 1);
    }

    #[test]
    fn test_file_based_library() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("library.db");

        let library = SqliteLibrary::new(&db_path).unwrap();
        library.upsert_series(&[series(1, "Dark")]).unwrap();
        assert!(db_path.exists());

        drop(library);
        let reopened = SqliteLibrary::new(&db_path).unwrap();
        assert_eq!(reopened.stats().unwrap().series, 1);
    }
}
