use crate::error::StoreError;
use crate::store::{clean, release_padded_id};
use common::model::folder::Folder;
use common::model::person::Department;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str = "SELECT id, name, number, client, service, budget, archived FROM folders";

struct FolderRow {
    id: Option<String>,
    name: Option<String>,
    number: Option<String>,
    client: Option<String>,
    service: Option<String>,
    budget: Option<f64>,
    archived: Option<i64>,
}

impl FolderRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FolderRow {
            id: row.get(0)?,
            name: row.get(1)?,
            number: row.get(2)?,
            client: row.get(3)?,
            service: row.get(4)?,
            // Budgets typed in by hand sometimes land as text.
            budget: row.get(5).ok().flatten(),
            archived: row.get(6).ok().flatten(),
        })
    }

    fn normalize(self) -> Option<Folder> {
        let Some(id) = clean(self.id) else {
            warn!("Dropping folder row without identifier");
            return None;
        };
        let service = clean(self.service).and_then(|s| match s.parse::<Department>() {
            Ok(service) => Some(service),
            Err(err) => {
                warn!("Folder {}: {}", id, err);
                None
            }
        });
        Some(Folder {
            name: clean(self.name).unwrap_or_default(),
            number: clean(self.number).unwrap_or_default(),
            client: clean(self.client).unwrap_or_default(),
            service,
            budget_hours: self.budget.filter(|b| b.is_finite() && *b > 0.0).unwrap_or(0.0),
            archived: self.archived.unwrap_or(0) != 0,
            id,
        })
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Folder>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY number, name", SELECT))?;
    let rows = stmt
        .query_map([], FolderRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().filter_map(FolderRow::normalize).collect())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Folder>, StoreError> {
    let row = conn
        .query_row(
            &format!("{} WHERE trim(id) = ?1", SELECT),
            params![id.trim()],
            FolderRow::read,
        )
        .optional()?;
    Ok(row.and_then(FolderRow::normalize))
}

pub fn upsert(conn: &Connection, folder: &Folder) -> Result<(), StoreError> {
    release_padded_id(conn, "folders", &folder.id)?;
    conn.execute(
        "INSERT OR REPLACE INTO folders (id, name, number, client, service, budget, archived)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            folder.id,
            folder.name,
            folder.number,
            folder.client,
            folder.service.map(|s| s.as_str()),
            folder.budget_hours,
            folder.archived,
        ],
    )?;
    Ok(())
}

/// Soft delete: the row stays so historic entries still resolve.
pub fn archive(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE folders SET archived = 1 WHERE trim(id) = ?1",
        params![id.trim()],
    )?;
    Ok(changed > 0)
}
