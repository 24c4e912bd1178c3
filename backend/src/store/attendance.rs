use crate::error::StoreError;
use crate::store::{clean, date_to_store, release_padded_id, time_to_store};
use chrono::NaiveDate;
use common::model::attendance::Attendance;
use common::model::{parse_date, parse_time};
use log::warn;
use rusqlite::{params, Connection, Row};

const SELECT: &str = "SELECT id, person_id, date, check_in, check_out FROM attendance";

fn read(row: &Row<'_>) -> rusqlite::Result<[Option<String>; 5]> {
    Ok([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?])
}

fn normalize([id, person_id, date, check_in, check_out]: [Option<String>; 5]) -> Option<Attendance> {
    let id = clean(id)?;
    let record = (|| {
        Some(Attendance {
            person_id: clean(person_id)?,
            date: parse_date(&clean(date)?)?,
            check_in: parse_time(&clean(check_in)?)?,
            check_out: clean(check_out).and_then(|t| parse_time(&t)),
            id: id.clone(),
        })
    })();
    if record.is_none() {
        warn!("Dropping attendance row {}: missing person, date or check-in", id);
    }
    record
}

pub fn list(conn: &Connection) -> Result<Vec<Attendance>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC, check_in", SELECT))?;
    let rows = stmt
        .query_map([], read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().filter_map(normalize).collect())
}

/// The record of `person_id` for `date`, if they already checked in.
///
/// Dates are compared after parsing, since older rows may hold `dd/mm/yyyy`.
pub fn find(
    conn: &Connection,
    person_id: &str,
    date: NaiveDate,
) -> Result<Option<Attendance>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} WHERE trim(person_id) = ?1", SELECT))?;
    let rows = stmt
        .query_map(params![person_id.trim()], read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows
        .into_iter()
        .filter_map(normalize)
        .find(|record| record.date == date))
}

pub fn upsert(conn: &Connection, record: &Attendance) -> Result<(), StoreError> {
    release_padded_id(conn, "attendance", &record.id)?;
    conn.execute(
        "INSERT OR REPLACE INTO attendance (id, person_id, date, check_in, check_out)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id,
            record.person_id,
            date_to_store(record.date),
            time_to_store(record.check_in),
            record.check_out.map(time_to_store),
        ],
    )?;
    Ok(())
}
