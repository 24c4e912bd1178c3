use crate::model::person::Department;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hours logged by one person on one folder for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub person_id: String,
    pub folder_id: Option<String>,
    pub hours: f64,
    pub date: NaiveDate,
    pub description: String,
    /// Copy of the folder's service type taken when the entry was written.
    pub service: Option<Department>,
    pub fiscal_year: String,
}

/// Payload of the entry form and of the edit modal.
///
/// Omitted fields take the form defaults: the session person, today's date,
/// the folder's service and the year of `date`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntryForm {
    pub id: Option<String>,
    pub person_id: Option<String>,
    pub folder_id: Option<String>,
    pub hours: f64,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub service: Option<Department>,
    pub fiscal_year: Option<String>,
}
