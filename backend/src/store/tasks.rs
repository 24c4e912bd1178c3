use crate::error::StoreError;
use crate::store::{clean, date_to_store, release_padded_id};
use common::model::parse_date;
use common::model::person::Department;
use common::model::task::{join_assignees, parse_assignees, TaskAssignment, TaskStatus, Urgency};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT: &str = "SELECT id, title, assignees, creator_id, department, deadline, urgency, status, fiscal_year FROM tasks";

struct TaskRow {
    id: Option<String>,
    title: Option<String>,
    assignees: Option<String>,
    creator_id: Option<String>,
    department: Option<String>,
    deadline: Option<String>,
    urgency: Option<String>,
    status: Option<String>,
    fiscal_year: Option<String>,
}

impl TaskRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TaskRow {
            id: row.get(0)?,
            title: row.get(1)?,
            assignees: row.get(2)?,
            creator_id: row.get(3)?,
            department: row.get(4)?,
            deadline: row.get(5)?,
            urgency: row.get(6)?,
            status: row.get(7)?,
            fiscal_year: row.get(8)?,
        })
    }

    fn normalize(self) -> Option<TaskAssignment> {
        let Some(id) = clean(self.id) else {
            warn!("Dropping task row without identifier");
            return None;
        };
        let deadline = clean(self.deadline).and_then(|d| {
            let parsed = parse_date(&d);
            if parsed.is_none() {
                warn!("Task {} has an unreadable deadline {:?}", id, d);
            }
            parsed
        });
        Some(TaskAssignment {
            title: self.title.unwrap_or_default().trim().to_string(),
            assignees: parse_assignees(self.assignees.as_deref().unwrap_or_default()),
            creator_id: clean(self.creator_id).unwrap_or_default(),
            department: clean(self.department).and_then(|d| d.parse::<Department>().ok()),
            deadline,
            urgency: Urgency::from_store(self.urgency.as_deref().unwrap_or_default()),
            status: TaskStatus::from_store(self.status.as_deref().unwrap_or_default()),
            fiscal_year: clean(self.fiscal_year).unwrap_or_default(),
            id,
        })
    }
}

pub fn list(conn: &Connection) -> Result<Vec<TaskAssignment>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY deadline", SELECT))?;
    let rows = stmt
        .query_map([], TaskRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().filter_map(TaskRow::normalize).collect())
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<TaskAssignment>, StoreError> {
    let row = conn
        .query_row(
            &format!("{} WHERE trim(id) = ?1", SELECT),
            params![id.trim()],
            TaskRow::read,
        )
        .optional()?;
    Ok(row.and_then(TaskRow::normalize))
}

pub fn upsert(conn: &Connection, task: &TaskAssignment) -> Result<(), StoreError> {
    release_padded_id(conn, "tasks", &task.id)?;
    conn.execute(
        "INSERT OR REPLACE INTO tasks (id, title, assignees, creator_id, department, deadline, urgency, status, fiscal_year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            task.id,
            task.title,
            join_assignees(&task.assignees),
            task.creator_id,
            task.department.map(|d| d.as_str()),
            task.deadline.map(date_to_store),
            task.urgency.as_str(),
            task.status.as_str(),
            task.fiscal_year,
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: &str) -> Result<bool, StoreError> {
    let removed = conn.execute("DELETE FROM tasks WHERE trim(id) = ?1", params![id.trim()])?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::temp_store;
    use chrono::NaiveDate;
    use common::model::task::{Assignee, Pool};
    use pretty_assertions::assert_eq;

    #[test]
    fn task_round_trip_keeps_pools() {
        let temp = temp_store();
        let conn = temp.store.connect().unwrap();
        let task = TaskAssignment {
            id: "t1".into(),
            title: "Review".into(),
            assignees: vec![Assignee::Individual("p2".into()), Assignee::Pool(Pool::Expertise)],
            creator_id: "p1".into(),
            department: Some(Department::Expertise),
            deadline: NaiveDate::from_ymd_opt(2025, 4, 1),
            urgency: Urgency::Critical,
            status: TaskStatus::Todo,
            fiscal_year: "2025".into(),
        };
        upsert(&conn, &task).unwrap();
        let stored: String = conn
            .query_row("SELECT assignees FROM tasks WHERE id = 't1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "p2,POLE_EXPERTISE");
        assert_eq!(get(&conn, "t1").unwrap(), Some(task));
        assert!(delete(&conn, "t1").unwrap());
    }

    #[test]
    fn loose_columns_fall_back() {
        let temp = temp_store();
        let conn = temp.store.connect().unwrap();
        conn.execute_batch(
            "INSERT INTO tasks (id, title, assignees, urgency, status, deadline)
             VALUES ('t1', ' Call ', 'p1,,p1', 'HIGH', 'DONE', 'tomorrow');",
        )
        .unwrap();
        let tasks = list(&conn).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call");
        assert_eq!(tasks[0].assignees, vec![Assignee::Individual("p1".into())]);
        assert_eq!(tasks[0].urgency, Urgency::Normal);
        assert_eq!(tasks[0].status, TaskStatus::Done);
        assert_eq!(tasks[0].deadline, None);
    }
}
