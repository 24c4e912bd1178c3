//! Spreadsheet layouts of the filtered entry list.
//!
//! Two layouts exist: a flat sheet with one row per entry, and a sheet
//! grouped by folder with per-person subtotals. Both are plain rows of cells;
//! the backend writes them out as CSV.

use crate::model::person::Department;
use crate::model::snapshot::Directory;
use crate::model::time_entry::TimeEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Row = Vec<String>;

pub const FLAT_HEADER: [&str; 8] = [
    "Date",
    "Person",
    "Folder number",
    "Folder",
    "Service",
    "Fiscal year",
    "Description",
    "Hours",
];

pub const GROUPED_HEADER: [&str; 5] = ["Date", "Person", "Description", "Fiscal year", "Hours"];

const UNASSIGNED_FOLDER: &str = "Unassigned";

/// `"AUDIT"` for audit work, `"EXPERTISE"` for everything else.
pub fn kind_label(department: Option<Department>) -> &'static str {
    if department.is_some_and(|d| d.is_audit()) {
        "AUDIT"
    } else {
        "EXPERTISE"
    }
}

/// `CAC{year}` for audit work, `EX{year}` otherwise; empty without a year.
pub fn fiscal_label(department: Option<Department>, fiscal_year: &str) -> String {
    let year = fiscal_year.trim();
    if year.is_empty() {
        return String::new();
    }
    if department.is_some_and(|d| d.is_audit()) {
        format!("CAC{}", year)
    } else {
        format!("EX{}", year)
    }
}

pub fn format_hours(hours: f64) -> String {
    let fixed = format!("{:.2}", hours);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn header(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

pub fn flat_rows(entries: &[&TimeEntry], directory: &Directory<'_>) -> Vec<Row> {
    let mut rows = vec![header(&FLAT_HEADER)];
    for entry in entries {
        let folder = directory.folder(entry.folder_id.as_deref());
        let department = directory.entry_department(entry);
        rows.push(vec![
            entry.date.to_string(),
            directory.person_name(&entry.person_id),
            folder.map(|f| f.number.clone()).unwrap_or_default(),
            folder.map(|f| f.name.clone()).unwrap_or_default(),
            department.map(|d| d.as_str().to_string()).unwrap_or_default(),
            fiscal_label(department, &entry.fiscal_year),
            entry.description.clone(),
            format_hours(entry.hours),
        ]);
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonShare {
    pub name: String,
    pub hours: f64,
    /// Percent of the folder total, one decimal.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderGroup {
    pub number: String,
    pub name: String,
    pub client: String,
    pub department: Option<Department>,
    pub total_hours: f64,
    pub entries: Vec<TimeEntry>,
    pub subtotals: Vec<PersonShare>,
}

/// Groups entries by resolved folder number and name rather than by raw
/// identifier, so entries whose folder is unknown still land in one group.
pub fn group_by_folder(entries: &[&TimeEntry], directory: &Directory<'_>) -> Vec<FolderGroup> {
    let mut groups: BTreeMap<(String, String), Vec<&TimeEntry>> = BTreeMap::new();
    for &entry in entries {
        let key = match directory.folder(entry.folder_id.as_deref()) {
            Some(folder) => (folder.number.clone(), folder.name.clone()),
            None => (String::new(), UNASSIGNED_FOLDER.to_string()),
        };
        groups.entry(key).or_default().push(entry);
    }

    groups
        .into_iter()
        .map(|((number, name), mut members)| {
            members.sort_by(|a, b| b.date.cmp(&a.date));
            let folder = members
                .iter()
                .find_map(|e| directory.folder(e.folder_id.as_deref()));
            let department = members.first().and_then(|e| directory.entry_department(e));
            let total_hours: f64 = members.iter().map(|e| e.hours).sum();

            let mut per_person: BTreeMap<&str, f64> = BTreeMap::new();
            for entry in &members {
                *per_person.entry(entry.person_id.trim()).or_default() += entry.hours;
            }
            let mut subtotals: Vec<PersonShare> = per_person
                .into_iter()
                .map(|(person_id, hours)| PersonShare {
                    name: directory.person_name(person_id),
                    hours,
                    share: share_percent(hours, total_hours),
                })
                .collect();
            subtotals.sort_by(|a, b| b.hours.total_cmp(&a.hours));

            FolderGroup {
                number,
                name,
                client: folder.map(|f| f.client.clone()).unwrap_or_default(),
                department,
                total_hours,
                entries: members.into_iter().cloned().collect(),
                subtotals,
            }
        })
        .collect()
}

fn share_percent(hours: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (hours / total * 1000.0).round() / 10.0
}

pub fn grouped_rows(groups: &[FolderGroup], directory: &Directory<'_>) -> Vec<Row> {
    let mut rows = vec![header(&GROUPED_HEADER)];
    for group in groups {
        let title = if group.number.is_empty() {
            group.name.clone()
        } else {
            format!("{} - {}", group.number, group.name)
        };
        rows.push(vec![
            kind_label(group.department).to_string(),
            title,
            group.client.clone(),
            String::new(),
            format_hours(group.total_hours),
        ]);
        for entry in &group.entries {
            rows.push(vec![
                entry.date.to_string(),
                directory.person_name(&entry.person_id),
                entry.description.clone(),
                fiscal_label(directory.entry_department(entry), &entry.fiscal_year),
                format_hours(entry.hours),
            ]);
        }
        for subtotal in &group.subtotals {
            rows.push(vec![
                "Subtotal".to_string(),
                subtotal.name.clone(),
                String::new(),
                format!("{:.1}%", subtotal.share),
                format_hours(subtotal.hours),
            ]);
        }
        rows.push(Vec::new());
    }
    rows
}
