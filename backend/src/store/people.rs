use crate::error::StoreError;
use crate::store::{clean, date_to_store, release_padded_id, time_to_store};
use common::model::person::{default_end_time, default_start_time, Department, Person, Role};
use common::model::{parse_date, parse_time};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str =
    "SELECT id, name, department, role, hire_date, start_time, end_time, pin FROM people";

struct PersonRow {
    id: Option<String>,
    name: Option<String>,
    department: Option<String>,
    role: Option<String>,
    hire_date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    pin: Option<String>,
}

impl PersonRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(PersonRow {
            id: row.get(0)?,
            name: row.get(1)?,
            department: row.get(2)?,
            role: row.get(3)?,
            hire_date: row.get(4)?,
            start_time: row.get(5)?,
            end_time: row.get(6)?,
            pin: row.get(7)?,
        })
    }

    fn normalize(self) -> Option<Person> {
        let Some(id) = clean(self.id) else {
            warn!("Dropping person row without identifier");
            return None;
        };
        let department = clean(self.department)
            .and_then(|d| d.parse::<Department>().ok())
            .unwrap_or_else(|| {
                warn!("Person {} has no known department, defaulting to Audit", id);
                Department::Audit
            });
        Some(Person {
            name: clean(self.name).unwrap_or_default(),
            department,
            role: clean(self.role)
                .and_then(|r| r.parse::<Role>().ok())
                .unwrap_or(Role::Collaborator),
            hire_date: clean(self.hire_date).and_then(|d| parse_date(&d)),
            start_time: clean(self.start_time)
                .and_then(|t| parse_time(&t))
                .unwrap_or_else(default_start_time),
            end_time: clean(self.end_time)
                .and_then(|t| parse_time(&t))
                .unwrap_or_else(default_end_time),
            pin_hash: self.pin.unwrap_or_default(),
            id,
        })
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Person>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY name", SELECT))?;
    let rows = stmt
        .query_map([], PersonRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().filter_map(PersonRow::normalize).collect())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Person>, StoreError> {
    let row = conn
        .query_row(
            &format!("{} WHERE trim(id) = ?1", SELECT),
            params![id.trim()],
            PersonRow::read,
        )
        .optional()?;
    Ok(row.and_then(PersonRow::normalize))
}

/// Inserts or replaces the whole row.
pub fn upsert(conn: &Connection, person: &Person) -> Result<(), StoreError> {
    release_padded_id(conn, "people", &person.id)?;
    conn.execute(
        "INSERT OR REPLACE INTO people (id, name, department, role, hire_date, start_time, end_time, pin)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            person.id,
            person.name,
            person.department.as_str(),
            person.role.as_str(),
            person.hire_date.map(date_to_store),
            time_to_store(person.start_time),
            time_to_store(person.end_time),
            person.pin_hash,
        ],
    )?;
    Ok(())
}

pub fn set_pin(conn: &Connection, id: &str, pin_hash: &str) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE people SET pin = ?1 WHERE trim(id) = ?2",
        params![pin_hash, id.trim()],
    )?;
    Ok(())
}

/// Returns whether a row was removed.
pub fn delete(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    let removed = conn.execute("DELETE FROM people WHERE trim(id) = ?1", params![id.trim()])?;
    Ok(removed > 0)
}
