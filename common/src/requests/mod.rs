use crate::model::person::Department;
use crate::model::snapshot::Snapshot;
use crate::model::task::Assignee;
use crate::rules::import::ImportedRecord;
use crate::rules::punctuality::TimeRange;
use crate::rules::visibility::TaskTab;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub person_id: String,
    pub pin: String,
}

/// Body of `POST /api/tasks/{id}/reassign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignRequest {
    pub assignees: Vec<Assignee>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub tab: TaskTab,
    pub pole: Option<Department>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// `?date=` on attendance and presence endpoints; today when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PunctualityQuery {
    pub person_id: Option<String>,
    #[serde(default)]
    pub range: TimeRange,
}

/// Body of `POST /api/import/apply`: the records of a verified import, as
/// reviewed by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyImportRequest {
    pub records: Vec<ImportedRecord>,
}

/// Reply of `POST /api/import/apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyImportOutcome {
    pub written: usize,
    /// One message per record that could not be written, with its position
    /// in the submitted list.
    pub rejected: Vec<(usize, String)>,
    pub snapshot: Snapshot,
}
