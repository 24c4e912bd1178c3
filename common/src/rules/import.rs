//! Spreadsheet import: positional columns per record kind.
//!
//! Problems never abort an import. A missing column or an unrecognised value
//! is reported as an [`ImportIssue`] and the field falls back to its default;
//! only rows that cannot yield a usable record (no name, unknown person, ...)
//! are left out, and those are reported too.

use crate::model::folder::FolderForm;
use crate::model::person::{Department, PersonForm, Role, default_end_time, default_start_time};
use crate::model::snapshot::Directory;
use crate::model::time_entry::EntryForm;
use crate::model::{parse_date, parse_time};
use crate::rules::validation::validate_pin;
use chrono::{Datelike, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// PIN given to imported people whose PIN cell is missing or malformed.
pub const DEFAULT_IMPORT_PIN: &str = "0000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    People,
    Folders,
    Entries,
}

impl ImportKind {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ImportKind::People => &[
                "name",
                "department",
                "role",
                "hire date",
                "start time",
                "end time",
                "pin",
            ],
            ImportKind::Folders => &["number", "name", "client", "service", "budget hours"],
            ImportKind::Entries => &[
                "date",
                "person",
                "folder number",
                "hours",
                "description",
                "fiscal year",
            ],
        }
    }
}

impl FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "people" => Ok(ImportKind::People),
            "folders" => Ok(ImportKind::Folders),
            "entries" => Ok(ImportKind::Entries),
            other => Err(format!("unknown import kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    /// 1-based spreadsheet row; the header is row 1.
    pub row: usize,
    pub column: String,
    pub message: String,
    /// True when the whole row was left out of the import.
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ImportedRecord {
    Person(PersonForm),
    Folder(FolderForm),
    Entry(EntryForm),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub kind: ImportKind,
    pub records: Vec<ImportedRecord>,
    pub issues: Vec<ImportIssue>,
}

/// Outcome of one data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub record: Option<ImportedRecord>,
    pub issues: Vec<ImportIssue>,
}

/// Flags every expected column the header row does not provide.
pub fn check_header(kind: ImportKind, header: &[String]) -> Vec<ImportIssue> {
    kind.columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| header.get(*idx).is_none_or(|cell| cell.trim().is_empty()))
        .map(|(_, column)| ImportIssue {
            row: 1,
            column: column.to_string(),
            message: "missing column".to_string(),
            skipped: false,
        })
        .collect()
}

struct RowReader<'r> {
    kind: ImportKind,
    row: usize,
    cells: &'r [String],
    issues: Vec<ImportIssue>,
}

impl<'r> RowReader<'r> {
    fn cell(&self, idx: usize) -> &'r str {
        self.cells.get(idx).map(|c| c.trim()).unwrap_or_default()
    }

    fn column(&self, idx: usize) -> &'static str {
        self.kind.columns().get(idx).copied().unwrap_or("?")
    }

    fn flag(&mut self, idx: usize, message: String) {
        self.issues.push(ImportIssue {
            row: self.row,
            column: self.column(idx).to_string(),
            message,
            skipped: false,
        });
    }

    fn skip(mut self, idx: usize, message: String) -> ParsedRow {
        self.issues.push(ImportIssue {
            row: self.row,
            column: self.column(idx).to_string(),
            message,
            skipped: true,
        });
        ParsedRow {
            record: None,
            issues: self.issues,
        }
    }

    fn done(self, record: ImportedRecord) -> ParsedRow {
        ParsedRow {
            record: Some(record),
            issues: self.issues,
        }
    }

    /// Parses an enum cell, flagging and defaulting unrecognised values.
    fn enumerated<T: FromStr<Err = String>>(&mut self, idx: usize, default: T) -> T {
        match self.cell(idx).parse::<T>() {
            Ok(value) => value,
            Err(err) => {
                self.flag(idx, err);
                default
            }
        }
    }

    fn time(&mut self, idx: usize, default: NaiveTime) -> NaiveTime {
        let raw = self.cell(idx);
        match parse_time(raw) {
            Some(time) => time,
            None => {
                if !raw.is_empty() {
                    self.flag(idx, format!("invalid time '{}'", raw));
                }
                default
            }
        }
    }
}

/// Turns one data row into a form record. `row` is the 1-based spreadsheet
/// row of these cells.
pub fn parse_row(
    kind: ImportKind,
    row: usize,
    cells: &[String],
    directory: &Directory<'_>,
) -> ParsedRow {
    let reader = RowReader {
        kind,
        row,
        cells,
        issues: Vec::new(),
    };
    match kind {
        ImportKind::People => parse_person(reader),
        ImportKind::Folders => parse_folder(reader),
        ImportKind::Entries => parse_entry(reader, directory),
    }
}

fn parse_person(mut r: RowReader<'_>) -> ParsedRow {
    let name = r.cell(0);
    if name.is_empty() {
        return r.skip(0, "name is required".to_string());
    }
    let department = r.enumerated(1, Department::Audit);
    let role = r.enumerated(2, Role::Collaborator);
    let hire_date = parse_date(r.cell(3));
    if hire_date.is_none() && !r.cell(3).is_empty() {
        r.flag(3, format!("invalid date '{}'", r.cell(3)));
    }
    let start_time = r.time(4, default_start_time());
    let end_time = r.time(5, default_end_time());
    let pin = match validate_pin(r.cell(6)) {
        Ok(()) => r.cell(6).to_string(),
        Err(err) => {
            r.flag(6, format!("{}, default PIN applied", err));
            DEFAULT_IMPORT_PIN.to_string()
        }
    };
    r.done(ImportedRecord::Person(PersonForm {
        id: None,
        name: name.to_string(),
        department,
        role,
        hire_date,
        start_time,
        end_time,
        pin: Some(pin),
    }))
}

fn parse_folder(mut r: RowReader<'_>) -> ParsedRow {
    let number = r.cell(0);
    let name = match r.cell(1) {
        "" if number.is_empty() => return r.skip(1, "name is required".to_string()),
        "" => number,
        name => name,
    };
    let service = match r.cell(3) {
        "" => None,
        raw => match raw.parse::<Department>() {
            Ok(service) => Some(service),
            Err(err) => {
                r.flag(3, err);
                None
            }
        },
    };
    let budget_hours = match r.cell(4).replace(',', ".").parse::<f64>() {
        Ok(budget) if budget.is_finite() && budget >= 0.0 => budget,
        _ => {
            if !r.cell(4).is_empty() {
                r.flag(4, format!("invalid budget '{}'", r.cell(4)));
            }
            0.0
        }
    };
    let client = r.cell(2).to_string();
    r.done(ImportedRecord::Folder(FolderForm {
        id: None,
        name: name.to_string(),
        number: number.to_string(),
        client,
        service,
        budget_hours,
    }))
}

fn parse_entry(r: RowReader<'_>, directory: &Directory<'_>) -> ParsedRow {
    let Some(date) = parse_date(r.cell(0)) else {
        let message = format!("invalid date '{}'", r.cell(0));
        return r.skip(0, message);
    };
    let Some(person) = directory.person_by_name(r.cell(1)) else {
        let message = format!("unknown person '{}'", r.cell(1));
        return r.skip(1, message);
    };
    let Some(folder) = directory.folder_by_number(r.cell(2)) else {
        let message = format!("unknown folder '{}'", r.cell(2));
        return r.skip(2, message);
    };
    let hours = match r.cell(3).replace(',', ".").parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours > 0.0 => hours,
        _ => {
            let message = format!("invalid hours '{}'", r.cell(3));
            return r.skip(3, message);
        }
    };
    let fiscal_year = match r.cell(5) {
        "" => date.year().to_string(),
        year => year.to_string(),
    };
    let description = r.cell(4).to_string();
    r.done(ImportedRecord::Entry(EntryForm {
        id: None,
        person_id: Some(person.id.clone()),
        folder_id: Some(folder.id.clone()),
        hours,
        date: Some(date),
        description,
        service: folder.service,
        fiscal_year: Some(fiscal_year),
    }))
}
