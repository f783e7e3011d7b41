//! SQLite backend.
//!
//! The playlist CSV is usually imported with its header row as column names,
//! which for the Kaggle export means names such as ` "artistname"` (leading
//! space and quotes included). Every query therefore discovers the columns
//! with `PRAGMA table_info` and quotes identifiers itself.

use super::{DataSource, DatasetTotals, Dimension, SampleMode, UserStats};
use crate::aggregate::RankedCount;
use crate::record::{Record, Sample};
use crate::schema::{self, DatasetFields, FieldRole};
use anyhow::{bail, Context, Result};
use log::{debug, trace};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// A table in a SQLite database file, opened read-only per query.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    table: String,
}

impl SqliteSource {
    #[must_use]
    pub fn new(path: &Path, table: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            table: table.to_string(),
        }
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open SQLite database at {}", self.path.display()))
    }

    /// Column names of the table in declaration order.
    fn columns(&self, conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(&self.table)))
            .context("Failed to prepare table_info query")?;

        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read table columns")?;

        if columns.is_empty() {
            bail!(
                "Table `{}` does not exist in {}",
                self.table,
                self.path.display()
            );
        }

        trace!("Columns of `{}`: {columns:?}", self.table);
        Ok(columns)
    }

    fn count_distinct(&self, conn: &Connection, columns: &[String], field: &str) -> Result<u64> {
        if !columns.iter().any(|c| c == field) {
            debug!("Column `{field}` not present, counting 0 distinct values");
            return Ok(0);
        }

        // Blank strings count as missing, the same as in rankings.
        let column = quote_ident(field);
        let sql = format!(
            "SELECT COUNT(DISTINCT {column}) FROM {} WHERE TRIM({column}) != ''",
            quote_ident(&self.table)
        );
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to count distinct values of `{field}`"))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn top_counts_for(&self, conn: &Connection, columns: &[String], field: &str, limit: usize) -> Result<Vec<RankedCount>> {
        if !columns.iter().any(|c| c == field) {
            debug!("Column `{field}` not present, no ranked counts");
            return Ok(Vec::new());
        }

        // Ties keep first-appearance order, like the in-memory ranking. Scan
        // position comes from ROW_NUMBER() since views and WITHOUT ROWID
        // tables have no rowid.
        let column = quote_ident(field);
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n
             FROM (SELECT {column}, ROW_NUMBER() OVER () AS ord FROM {table})
             WHERE {column} IS NOT NULL AND TRIM({column}) != ''
             GROUP BY {column}
             ORDER BY n DESC, MIN(ord) ASC
             LIMIT ?1",
            table = quote_ident(&self.table),
        );

        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Invalid SQL when ranking `{field}`"))?;
        let mut rows = stmt.query([sql_limit(limit)])?;

        let mut ranked = Vec::new();
        while let Some(row) = rows.next()? {
            let Some(key) = value_to_text(row.get_ref(0)?) else {
                continue;
            };
            let count: i64 = row.get(1)?;
            ranked.push(RankedCount::new(key, u64::try_from(count).unwrap_or(0)));
        }

        Ok(ranked)
    }
}

impl DataSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{} (table {})", self.path.display(), self.table)
    }

    fn ping(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .context("SQLite ping failed")?;
        self.columns(&conn)?;
        Ok(())
    }

    fn fetch_sample(&self, limit: usize, mode: SampleMode) -> Result<Sample> {
        let conn = self.connect()?;
        let table = quote_ident(&self.table);
        let sql = match mode {
            SampleMode::Random => format!("SELECT * FROM {table} ORDER BY RANDOM() LIMIT ?1"),
            SampleMode::Head => format!("SELECT * FROM {table} LIMIT ?1"),
        };

        let mut stmt = conn
            .prepare(&sql)
            .with_context(|| format!("Failed to prepare sample query on `{}`", self.table))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query([sql_limit(limit)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, name) in names.iter().enumerate() {
                if let Some(text) = value_to_text(row.get_ref(i)?) {
                    record.insert(name, &text);
                }
            }
            records.push(record);
        }

        debug!("Sampled {} records ({mode:?}) from {}", records.len(), self.describe());
        Ok(Sample::new(records))
    }

    fn fetch_top_counts(&self, dimension: Dimension, limit: usize) -> Result<Vec<RankedCount>> {
        let conn = self.connect()?;
        let columns = self.columns(&conn)?;
        let field = schema::resolve_or_default(&columns, dimension.role());
        debug!("Ranking {dimension:?} by column `{field}`");

        self.top_counts_for(&conn, &columns, &field, limit)
    }

    fn fetch_dataset_totals(&self) -> Result<DatasetTotals> {
        let conn = self.connect()?;
        let columns = self.columns(&conn)?;
        let fields = DatasetFields::resolve(&columns);
        debug!("Dataset fields: {fields:?}");

        let records: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", quote_ident(&self.table)), [], |row| row.get(0))
            .context("Failed to count records")?;

        Ok(DatasetTotals {
            records: u64::try_from(records).unwrap_or(0),
            artists: self.count_distinct(&conn, &columns, &fields.artist)?,
            tracks: self.count_distinct(&conn, &columns, &fields.track)?,
            playlists: self.count_distinct(&conn, &columns, &fields.playlist)?,
        })
    }

    fn fetch_user_stats(&self, limit: usize) -> Result<UserStats> {
        let conn = self.connect()?;
        let columns = self.columns(&conn)?;
        let field = schema::resolve_or_default(&columns, FieldRole::User);
        debug!("User column: `{field}`");

        Ok(UserStats {
            total_users: self.count_distinct(&conn, &columns, &field)?,
            top_users: self.top_counts_for(&conn, &columns, &field, limit)?,
        })
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Text form of a cell. NULLs and blobs have none.
fn value_to_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KAGGLE_COLUMNS: [&str; 4] = ["user_id", " \"artistname\"", " \"trackname\"", " \"playlistname\""];

    /// Helper: database with the Kaggle column names and the given rows of
    /// (user, artist, track, playlist).
    fn create_test_source(rows: &[(&str, &str, &str, Option<&str>)]) -> (TempDir, SqliteSource) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("spotify.db");
        let conn = Connection::open(&db_path).expect("Failed to open database");

        let columns = KAGGLE_COLUMNS
            .iter()
            .map(|c| format!("{} TEXT", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(&format!("CREATE TABLE spotify_dataset ({columns})"), [])
            .expect("Failed to create table");

        let mut stmt = conn
            .prepare("INSERT INTO spotify_dataset VALUES (?1, ?2, ?3, ?4)")
            .expect("Failed to prepare insert");
        for (user, artist, track, playlist) in rows {
            stmt.execute((user, artist, track, playlist))
                .expect("Failed to insert row");
        }

        (temp_dir, SqliteSource::new(&db_path, "spotify_dataset"))
    }

    fn standard_rows() -> Vec<(&'static str, &'static str, &'static str, Option<&'static str>)> {
        vec![
            ("u1", "Elvis Costello", "Alison", Some("HARD ROCK 2010")),
            ("u1", "Queen", "Bohemian Rhapsody", Some("HARD ROCK 2010")),
            ("u2", "Queen", "Somebody to Love", Some("Road Trip")),
            ("u2", "ABBA", "Waterloo", Some("Road Trip")),
            ("u2", "Elvis Costello", "Veronica", Some("Road Trip")),
            ("u3", "ABBA", "Dancing Queen", None),
            ("u3", "Queen", "Alison", Some("")),
        ]
    }

    #[test]
    fn test_ping_existing_and_missing_database() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        assert!(source.ping().is_ok());

        let missing = SqliteSource::new(Path::new("/nonexistent/dir/spotify.db"), "spotify_dataset");
        assert!(missing.ping().is_err());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let wrong_table = SqliteSource::new(&source.path, "playlists");

        assert!(wrong_table.ping().is_err());
        assert!(wrong_table.fetch_dataset_totals().is_err());
    }

    #[test]
    fn test_head_sample_keeps_column_order_and_drops_nulls() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let sample = source.fetch_sample(100, SampleMode::Head).unwrap();

        assert_eq!(sample.len(), 7);
        assert_eq!(sample.attribute_names(), KAGGLE_COLUMNS);
        assert_eq!(sample.records()[0].get(" \"artistname\""), Some("Elvis Costello"));
        assert_eq!(sample.records()[5].get(" \"playlistname\""), None);
    }

    #[test]
    fn test_random_sample_respects_limit() {
        let (_temp_dir, source) = create_test_source(&standard_rows());

        assert_eq!(source.fetch_sample(3, SampleMode::Random).unwrap().len(), 3);
        assert_eq!(source.fetch_sample(50, SampleMode::Random).unwrap().len(), 7);
    }

    #[test]
    fn test_top_artists_with_first_appearance_ties() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let top = source.fetch_top_counts(Dimension::Artist, 10).unwrap();

        assert_eq!(
            top,
            vec![
                RankedCount::new("Queen", 3),
                RankedCount::new("Elvis Costello", 2),
                RankedCount::new("ABBA", 2),
            ]
        );
    }

    #[test]
    fn test_top_playlists_skip_missing_values() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let top = source.fetch_top_counts(Dimension::Playlist, 1).unwrap();

        assert_eq!(top, vec![RankedCount::new("Road Trip", 3)]);
    }

    #[test]
    fn test_dataset_totals() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let totals = source.fetch_dataset_totals().unwrap();

        assert_eq!(
            totals,
            DatasetTotals {
                records: 7,
                artists: 3,
                tracks: 6,
                // NULL and "" are both missing.
                playlists: 2,
            }
        );
    }

    #[test]
    fn test_user_stats() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        let stats = source.fetch_user_stats(2).unwrap();

        assert_eq!(stats.total_users, 3);
        assert_eq!(
            stats.top_users,
            vec![RankedCount::new("u2", 3), RankedCount::new("u1", 2)]
        );
    }

    #[test]
    fn test_integer_cells_become_text() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("numeric.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE spotify_dataset (artist TEXT, playlist_id INTEGER)", [])
            .unwrap();
        conn.execute("INSERT INTO spotify_dataset VALUES ('Queen', 42)", [])
            .unwrap();

        let source = SqliteSource::new(&db_path, "spotify_dataset");
        let sample = source.fetch_sample(1, SampleMode::Head).unwrap();

        assert_eq!(sample.records()[0].get("playlist_id"), Some("42"));
    }

    #[test]
    fn test_rankings_through_a_view() {
        let (_temp_dir, source) = create_test_source(&standard_rows());
        {
            let conn = Connection::open(&source.path).unwrap();
            conn.execute("CREATE VIEW playlist_view AS SELECT * FROM spotify_dataset", [])
                .unwrap();
        }
        let view = SqliteSource::new(&source.path, "playlist_view");

        assert!(view.ping().is_ok());
        assert_eq!(
            view.fetch_top_counts(Dimension::Artist, 10).unwrap(),
            source.fetch_top_counts(Dimension::Artist, 10).unwrap()
        );
        assert_eq!(
            view.fetch_user_stats(2).unwrap().top_users,
            vec![RankedCount::new("u2", 3), RankedCount::new("u1", 2)]
        );
        assert_eq!(view.fetch_dataset_totals().unwrap().playlists, 2);
    }

    #[test]
    fn test_rankings_on_without_rowid_table() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("keyed.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute(
            "CREATE TABLE spotify_dataset (id INTEGER PRIMARY KEY, artist TEXT, playlist TEXT) WITHOUT ROWID",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO spotify_dataset VALUES (1, 'Queen', 'P1'), (2, 'ABBA', 'P1'), (3, 'Queen', 'P2')",
            [],
        )
        .unwrap();

        let source = SqliteSource::new(&db_path, "spotify_dataset");

        assert_eq!(
            source.fetch_top_counts(Dimension::Artist, 5).unwrap(),
            vec![RankedCount::new("Queen", 2), RankedCount::new("ABBA", 1)]
        );
    }

    #[test]
    fn test_blank_values_are_not_distinct_values() {
        let (_temp_dir, source) = create_test_source(&[
            ("u1", "Queen", "t1", Some("P1")),
            ("", "Queen", "t2", Some("  ")),
            ("u2", "ABBA", "t3", Some("")),
        ]);

        assert_eq!(source.fetch_dataset_totals().unwrap().playlists, 1);
        assert_eq!(source.fetch_user_stats(5).unwrap().total_users, 2);
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("artist"), "\"artist\"");
        assert_eq!(quote_ident(" \"artistname\""), "\" \"\"artistname\"\"\"");
    }
}
