use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::model::PennyRecord;
use crate::util::{ensure_parent_directory, now_utc_string, utc_string};

const DB_SCHEMA_VERSION: &str = "1";

pub trait DedupIndex {
    fn exists(&self, record: &PennyRecord) -> Result<bool>;

    fn add(&mut self, record: &PennyRecord) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPenny {
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub location: String,
    pub name: String,
    pub orientation: String,
    #[serde(rename = "type")]
    pub penny_type: String,
    pub year: String,
    pub position: Option<i64>,
    pub retired: bool,
    pub fingerprint: String,
    pub created_at: String,
}

pub struct PennyStore {
    connection: Connection,
}

impl PennyStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        ensure_parent_directory(db_path)?;
        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open dedup store {}", db_path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("failed to open in-memory dedup store")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn count(&self) -> Result<i64> {
        query_count(&self.connection, "SELECT COUNT(*) FROM pennies")
    }

    pub fn by_state(&self, state: &str) -> Result<Vec<StoredPenny>> {
        select_pennies(
            &self.connection,
            "WHERE state = ?1 ORDER BY year ASC, city ASC, id ASC",
            state,
        )
    }

    pub fn by_year(&self, year: &str) -> Result<Vec<StoredPenny>> {
        select_pennies(
            &self.connection,
            "WHERE year = ?1 ORDER BY state ASC, city ASC, id ASC",
            year,
        )
    }

    pub fn added_since(&self, since: DateTime<Utc>) -> Result<Vec<StoredPenny>> {
        select_pennies(
            &self.connection,
            "WHERE created_at > ?1 ORDER BY created_at DESC, id DESC",
            &utc_string(since),
        )
    }
}

impl DedupIndex for PennyStore {
    fn exists(&self, record: &PennyRecord) -> Result<bool> {
        fingerprint_exists(&self.connection, &record.fingerprint())
    }

    fn add(&mut self, record: &PennyRecord) -> Result<bool> {
        insert_penny(&self.connection, record, &now_utc_string())
    }
}

fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

fn fingerprint_exists(connection: &Connection, fingerprint: &str) -> Result<bool> {
    let found: i64 = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM pennies WHERE fingerprint = ?1)",
        [fingerprint],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

fn insert_penny(connection: &Connection, record: &PennyRecord, created_at: &str) -> Result<bool> {
    let changed = connection.execute(
        "
        INSERT INTO pennies(
          state, city, neighborhood, location, name, orientation, type,
          year, position, retired, fingerprint, created_at
        )
        VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(fingerprint) DO NOTHING
        ",
        params![
            record.state,
            record.city,
            record.neighborhood,
            record.location,
            record.name,
            record.orientation.as_str(),
            record.penny_type,
            record.year,
            record.position.map(i64::from),
            record.retired,
            record.fingerprint(),
            created_at,
        ],
    )?;
    Ok(changed == 1)
}

fn select_pennies(connection: &Connection, clause: &str, value: &str) -> Result<Vec<StoredPenny>> {
    let sql = format!(
        "
        SELECT state, city, neighborhood, location, name, orientation, type,
               year, position, retired, fingerprint, created_at
        FROM pennies
        {clause}
        "
    );
    let mut statement = connection.prepare(&sql)?;
    let mut rows = statement.query([value])?;
    let mut out = Vec::<StoredPenny>::new();

    while let Some(row) = rows.next()? {
        out.push(stored_penny_from_row(row)?);
    }

    Ok(out)
}

fn stored_penny_from_row(row: &Row<'_>) -> rusqlite::Result<StoredPenny> {
    Ok(StoredPenny {
        state: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        city: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        neighborhood: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        location: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        orientation: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        penny_type: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        year: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        position: row.get(8)?,
        retired: row.get::<_, Option<bool>>(9)?.unwrap_or(false),
        fingerprint: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pennies (
              id INTEGER PRIMARY KEY,
              state TEXT,
              city TEXT,
              neighborhood TEXT,
              location TEXT,
              name TEXT,
              orientation TEXT,
              type TEXT,
              year TEXT,
              position INTEGER,
              retired INTEGER,
              fingerprint TEXT NOT NULL UNIQUE,
              created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pennies_fingerprint ON pennies(fingerprint);
            CREATE INDEX IF NOT EXISTS idx_pennies_state ON pennies(state);
            CREATE INDEX IF NOT EXISTS idx_pennies_year ON pennies(year);
            ",
        )
        .context("failed to create dedup store schema")?;

    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;

    Ok(())
}
