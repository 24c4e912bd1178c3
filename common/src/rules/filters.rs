use crate::model::folder::Folder;
use crate::model::person::Department;
use crate::model::same_id;
use crate::model::snapshot::Directory;
use crate::model::task::TaskAssignment;
use crate::model::time_entry::TimeEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filters of the history view. Every criterion is optional; `from` and `to`
/// are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub pole: Option<Department>,
    pub person_id: Option<String>,
    pub search: Option<String>,
}

impl HistoryFilter {
    fn matches(&self, entry: &TimeEntry, directory: &Directory<'_>) -> bool {
        if self.from.is_some_and(|from| entry.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.date > to) {
            return false;
        }
        if let Some(pole) = self.pole {
            if directory.entry_department(entry) != Some(pole) {
                return false;
            }
        }
        if let Some(person_id) = self.person_id.as_deref().filter(|p| !p.trim().is_empty()) {
            if !same_id(&entry.person_id, person_id) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => search_haystack(entry, directory).contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

fn search_haystack(entry: &TimeEntry, directory: &Directory<'_>) -> String {
    let mut haystack = entry.description.to_lowercase();
    haystack.push('\n');
    haystack.push_str(&directory.person_name(&entry.person_id).to_lowercase());
    if let Some(folder) = directory.folder(entry.folder_id.as_deref()) {
        for part in [&folder.name, &folder.number, &folder.client] {
            haystack.push('\n');
            haystack.push_str(&part.to_lowercase());
        }
    }
    haystack
}

/// History rows matching `filter`, most recent first.
pub fn filter_history<'a>(
    entries: &'a [TimeEntry],
    directory: &Directory<'_>,
    filter: &HistoryFilter,
) -> Vec<&'a TimeEntry> {
    let mut rows: Vec<&TimeEntry> = entries
        .iter()
        .filter(|e| filter.matches(e, directory))
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Folders offered in pickers: archived ones are left out.
pub fn active_folders(folders: &[Folder]) -> Vec<&Folder> {
    let mut active: Vec<&Folder> = folders.iter().filter(|f| !f.archived).collect();
    active.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.name.cmp(&b.name)));
    active
}

pub fn tasks_for_pole(tasks: &[TaskAssignment], pole: Option<Department>) -> Vec<&TaskAssignment> {
    tasks
        .iter()
        .filter(|t| pole.is_none() || t.department == pole)
        .collect()
}
