use crate::model::person::Department;
use serde::{Deserialize, Serialize};

/// A client engagement against which time is logged.
///
/// Archiving is a soft delete: archived folders stay resolvable from historic
/// entries but are left out of the active pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub number: String,
    pub client: String,
    pub service: Option<Department>,
    pub budget_hours: f64,
    pub archived: bool,
}

impl Folder {
    /// `"{number} - {name}"`, or only the name when the folder has no number.
    pub fn label(&self) -> String {
        if self.number.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.number, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderForm {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub client: String,
    pub service: Option<Department>,
    #[serde(default)]
    pub budget_hours: f64,
}
