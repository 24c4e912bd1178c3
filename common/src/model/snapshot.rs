use crate::model::attendance::Attendance;
use crate::model::folder::Folder;
use crate::model::person::{Department, Person};
use crate::model::task::TaskAssignment;
use crate::model::time_entry::TimeEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The five collections as last read from the store.
///
/// Every write is answered with a fresh `Snapshot`; nothing is patched in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub people: Vec<Person>,
    pub folders: Vec<Folder>,
    pub entries: Vec<TimeEntry>,
    pub tasks: Vec<TaskAssignment>,
    pub attendance: Vec<Attendance>,
}

impl Snapshot {
    pub fn directory(&self) -> Directory<'_> {
        Directory::new(&self.people, &self.folders)
    }
}

/// Identifier lookups over a loaded snapshot. Keys are trimmed.
pub struct Directory<'a> {
    people: HashMap<&'a str, &'a Person>,
    folders: HashMap<&'a str, &'a Folder>,
}

impl<'a> Directory<'a> {
    pub fn new(people: &'a [Person], folders: &'a [Folder]) -> Self {
        Self {
            people: people.iter().map(|p| (p.id.trim(), p)).collect(),
            folders: folders.iter().map(|f| (f.id.trim(), f)).collect(),
        }
    }

    pub fn person(&self, id: &str) -> Option<&'a Person> {
        self.people.get(id.trim()).copied()
    }

    pub fn folder(&self, id: Option<&str>) -> Option<&'a Folder> {
        id.and_then(|id| self.folders.get(id.trim()).copied())
    }

    /// Case-insensitive lookup used when spreadsheets reference people by name.
    pub fn person_by_name(&self, name: &str) -> Option<&'a Person> {
        let wanted = name.trim().to_lowercase();
        self.people
            .values()
            .copied()
            .find(|p| p.name.trim().to_lowercase() == wanted)
    }

    pub fn folder_by_number(&self, number: &str) -> Option<&'a Folder> {
        let wanted = number.trim();
        self.folders
            .values()
            .copied()
            .find(|f| !wanted.is_empty() && f.number.trim() == wanted)
    }

    pub fn person_name(&self, id: &str) -> String {
        self.person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.trim().to_string())
    }

    /// Department an entry is reported under: the folder's service when the
    /// folder is known and has one, otherwise the service stored on the entry.
    pub fn entry_department(&self, entry: &TimeEntry) -> Option<Department> {
        self.folder(entry.folder_id.as_deref())
            .and_then(|f| f.service)
            .or(entry.service)
    }
}
