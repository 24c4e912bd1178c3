use crate::error::StoreError;
use crate::store::{clean, date_to_store, release_padded_id};
use chrono::Datelike;
use common::model::parse_date;
use common::model::person::Department;
use common::model::time_entry::TimeEntry;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str =
    "SELECT id, person_id, folder_id, hours, date, description, service, fiscal_year FROM time_entries";

struct EntryRow {
    id: Option<String>,
    person_id: Option<String>,
    folder_id: Option<String>,
    hours: Option<f64>,
    date: Option<String>,
    description: Option<String>,
    service: Option<String>,
    fiscal_year: Option<String>,
}

impl EntryRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(EntryRow {
            id: row.get(0)?,
            person_id: row.get(1)?,
            folder_id: row.get(2)?,
            hours: row.get(3).ok().flatten(),
            date: row.get(4)?,
            description: row.get(5)?,
            service: row.get(6)?,
            fiscal_year: row.get(7)?,
        })
    }

    fn normalize(self) -> Option<TimeEntry> {
        let id = clean(self.id)?;
        let (Some(person_id), Some(date)) =
            (clean(self.person_id), clean(self.date).and_then(|d| parse_date(&d)))
        else {
            warn!("Dropping time entry {}: missing person or date", id);
            return None;
        };
        let hours = self.hours.filter(|h| h.is_finite()).unwrap_or_else(|| {
            warn!("Time entry {} has no readable duration", id);
            0.0
        });
        Some(TimeEntry {
            person_id,
            folder_id: clean(self.folder_id),
            hours,
            description: self.description.unwrap_or_default(),
            service: clean(self.service).and_then(|s| s.parse::<Department>().ok()),
            fiscal_year: clean(self.fiscal_year).unwrap_or_else(|| date.year().to_string()),
            date,
            id,
        })
    }
}

pub fn list(conn: &Connection) -> Result<Vec<TimeEntry>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC", SELECT))?;
    let rows = stmt
        .query_map([], EntryRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().filter_map(EntryRow::normalize).collect())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<TimeEntry>, StoreError> {
    let row = conn
        .query_row(
            &format!("{} WHERE trim(id) = ?1", SELECT),
            params![id.trim()],
            EntryRow::read,
        )
        .optional()?;
    Ok(row.and_then(EntryRow::normalize))
}

pub fn upsert(conn: &Connection, entry: &TimeEntry) -> Result<(), StoreError> {
    release_padded_id(conn, "time_entries", &entry.id)?;
    conn.execute(
        "INSERT OR REPLACE INTO time_entries (id, person_id, folder_id, hours, date, description, service, fiscal_year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.person_id,
            entry.folder_id,
            entry.hours,
            date_to_store(entry.date),
            entry.description,
            entry.service.map(|s| s.as_str()),
            entry.fiscal_year,
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    let removed = conn.execute(
        "DELETE FROM time_entries WHERE trim(id) = ?1",
        params![id.trim()],
    )?;
    Ok(removed > 0)
}
