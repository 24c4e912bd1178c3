//! Data access layer over the five record collections.
//!
//! Each collection module reads rows into raw column values, then normalises
//! them into the shared model: identifiers are trimmed, optional fields take
//! their defaults and rows that cannot be interpreted are dropped with a
//! warning. Reads always fetch whole collections; filtering happens in
//! `common::rules`.

pub mod attendance;
pub mod entries;
pub mod folders;
pub mod people;
pub mod pin;
pub mod tasks;

use crate::error::StoreError;
use chrono::{NaiveDate, NaiveTime};
use common::model::snapshot::Snapshot;
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS people (
    id TEXT PRIMARY KEY,
    name TEXT,
    department TEXT,
    role TEXT,
    hire_date TEXT,
    start_time TEXT,
    end_time TEXT,
    pin TEXT
);
CREATE TABLE IF NOT EXISTS folders (
    id TEXT PRIMARY KEY,
    name TEXT,
    number TEXT,
    client TEXT,
    service TEXT,
    budget REAL,
    archived INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS time_entries (
    id TEXT PRIMARY KEY,
    person_id TEXT,
    folder_id TEXT,
    hours REAL,
    date TEXT,
    description TEXT,
    service TEXT,
    fiscal_year TEXT
);
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT,
    assignees TEXT,
    creator_id TEXT,
    department TEXT,
    deadline TEXT,
    urgency TEXT,
    status TEXT,
    fiscal_year TEXT
);
CREATE TABLE IF NOT EXISTS attendance (
    id TEXT PRIMARY KEY,
    person_id TEXT,
    date TEXT,
    check_in TEXT,
    check_out TEXT
);
";

/// Handle on the SQLite file. Every operation opens its own connection.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens (and if needed creates) the datastore at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Store {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?.execute_batch(SCHEMA)?;
        debug!("Datastore ready at {}", store.path.display());
        Ok(store)
    }

    pub fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Full reload of all five collections.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let conn = self.connect()?;
        Ok(Snapshot {
            people: people::list(&conn)?,
            folders: folders::list(&conn)?,
            entries: entries::list(&conn)?,
            tasks: tasks::list(&conn)?,
            attendance: attendance::list(&conn)?,
        })
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trimmed, non-empty text or `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Removes rows stored under a whitespace-padded form of `id`, so that the
/// following `INSERT OR REPLACE` keyed on the trimmed id leaves one row.
pub(crate) fn release_padded_id(conn: &Connection, table: &str, id: &str) -> Result<(), StoreError> {
    conn.execute(
        &format!("DELETE FROM {} WHERE trim(id) = ?1 AND id <> ?1", table),
        [id.trim()],
    )?;
    Ok(())
}

pub(crate) fn date_to_store(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn time_to_store(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
