use crate::model::attendance::Attendance;
use crate::model::folder::Folder;
use crate::model::person::Person;
use crate::model::same_id;
use crate::model::time_entry::TimeEntry;
use crate::rules::round_percent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Healthy,
    AtRisk,
    Over,
}

impl BudgetStatus {
    pub fn from_percent(percent: u32) -> BudgetStatus {
        if percent > 100 {
            BudgetStatus::Over
        } else if percent > 90 {
            BudgetStatus::AtRisk
        } else {
            BudgetStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderBudget {
    pub folder_id: String,
    pub label: String,
    pub budget_hours: f64,
    pub consumed_hours: f64,
    pub percent: u32,
    pub status: BudgetStatus,
}

pub fn consumed_hours(folder: &Folder, entries: &[&TimeEntry]) -> f64 {
    entries
        .iter()
        .filter(|e| e.folder_id.as_deref().is_some_and(|id| same_id(id, &folder.id)))
        .map(|e| e.hours)
        .sum()
}

/// A zero budget always reads as 0 %, whatever was consumed.
pub fn budget_percent(consumed: f64, budget: f64) -> u32 {
    if budget <= 0.0 {
        0
    } else {
        round_percent(consumed / budget * 100.0)
    }
}

pub fn folder_budget(folder: &Folder, entries: &[&TimeEntry]) -> FolderBudget {
    let consumed = consumed_hours(folder, entries);
    let percent = budget_percent(consumed, folder.budget_hours);
    FolderBudget {
        folder_id: folder.id.clone(),
        label: folder.label(),
        budget_hours: folder.budget_hours,
        consumed_hours: consumed,
        percent,
        status: BudgetStatus::from_percent(percent),
    }
}

/// Budget lines for the dashboard: every active folder, plus archived folders
/// that still have hours in `entries`. Highest consumption first.
pub fn budget_report(folders: &[Folder], entries: &[&TimeEntry]) -> Vec<FolderBudget> {
    let mut report: Vec<FolderBudget> = folders
        .iter()
        .map(|f| (f, folder_budget(f, entries)))
        .filter(|(f, line)| !f.archived || line.consumed_hours > 0.0)
        .map(|(_, line)| line)
        .collect();
    report.sort_by(|a, b| b.percent.cmp(&a.percent).then_with(|| a.label.cmp(&b.label)));
    report
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProductivity {
    pub person_id: String,
    pub name: String,
    pub total_hours: f64,
    pub folder_count: usize,
}

/// Hours and distinct folders per person who logged time in `entries`,
/// most hours first.
pub fn productivity(people: &[Person], entries: &[&TimeEntry]) -> Vec<PersonProductivity> {
    let mut rows: Vec<PersonProductivity> = people
        .iter()
        .filter_map(|person| {
            let own: Vec<&&TimeEntry> = entries
                .iter()
                .filter(|e| same_id(&e.person_id, &person.id))
                .collect();
            if own.is_empty() {
                return None;
            }
            let folders: HashSet<&str> = own
                .iter()
                .filter_map(|e| e.folder_id.as_deref().map(str::trim))
                .collect();
            Some(PersonProductivity {
                person_id: person.id.clone(),
                name: person.name.clone(),
                total_hours: own.iter().map(|e| e.hours).sum(),
                folder_count: folders.len(),
            })
        })
        .collect();
    rows.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceSummary {
    pub date: NaiveDate,
    pub present: usize,
    pub roster: usize,
    pub rate: u32,
}

/// Share of the roster with an attendance record on `date`.
pub fn presence(people: &[Person], attendance: &[Attendance], date: NaiveDate) -> PresenceSummary {
    let checked_in: HashMap<&str, &Attendance> = attendance
        .iter()
        .filter(|a| a.date == date)
        .map(|a| (a.person_id.trim(), a))
        .collect();
    let present = people
        .iter()
        .filter(|p| checked_in.contains_key(p.id.trim()))
        .count();
    let rate = if people.is_empty() {
        0
    } else {
        round_percent(present as f64 / people.len() as f64 * 100.0)
    };
    PresenceSummary {
        date,
        present,
        roster: people.len(),
        rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::{Department, Role};
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn folder(id: &str, budget: f64) -> Folder {
        Folder {
            id: id.into(),
            name: "Closing".into(),
            number: "F-1".into(),
            client: "ACME".into(),
            service: Some(Department::Audit),
            budget_hours: budget,
            archived: false,
        }
    }

    fn entry(person: &str, folder: &str, hours: f64) -> TimeEntry {
        TimeEntry {
            id: format!("{}-{}-{}", person, folder, hours),
            person_id: person.into(),
            folder_id: Some(folder.into()),
            hours,
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            description: String::new(),
            service: None,
            fiscal_year: "2025".into(),
        }
    }

    fn person(id: &str, name: &str) -> Person {
        Person {
            id: id.into(),
            name: name.into(),
            department: Department::Audit,
            role: Role::Collaborator,
            hire_date: None,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            pin_hash: String::new(),
        }
    }

    #[test]
    fn over_budget_folder() {
        let f = folder("F", 40.0);
        let entries = [entry("p", "F", 10.0), entry("p", " F ", 15.0), entry("p", "F", 20.0)];
        let refs: Vec<&TimeEntry> = entries.iter().collect();
        let line = folder_budget(&f, &refs);
        assert_eq!(line.consumed_hours, 45.0);
        assert_eq!(line.percent, 113);
        assert_eq!(line.status, BudgetStatus::Over);
    }

    #[test]
    fn zero_budget_reads_zero_percent() {
        let f = folder("F", 0.0);
        let entries = [entry("p", "F", 100.0)];
        let refs: Vec<&TimeEntry> = entries.iter().collect();
        let line = folder_budget(&f, &refs);
        assert_eq!(line.percent, 0);
        assert_eq!(line.status, BudgetStatus::Healthy);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(BudgetStatus::from_percent(90), BudgetStatus::Healthy);
        assert_eq!(BudgetStatus::from_percent(91), BudgetStatus::AtRisk);
        assert_eq!(BudgetStatus::from_percent(100), BudgetStatus::AtRisk);
        assert_eq!(BudgetStatus::from_percent(101), BudgetStatus::Over);
    }

    #[test]
    fn report_is_idempotent_and_keeps_consumed_archived_folders() {
        let mut archived = folder("A", 10.0);
        archived.archived = true;
        let mut idle_archived = folder("B", 10.0);
        idle_archived.archived = true;
        let folders = vec![folder("F", 40.0), archived, idle_archived];
        let entries = [entry("p", "F", 4.0), entry("p", "A", 9.5)];
        let refs: Vec<&TimeEntry> = entries.iter().collect();

        let first = budget_report(&folders, &refs);
        let second = budget_report(&folders, &refs);
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|l| l.folder_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "F"]);
    }

    #[test]
    fn productivity_sorted_by_hours() {
        let people = vec![person("a", "Alice"), person("b", "Bob"), person("c", "Carol")];
        let entries = [
            entry("a", "F", 2.0),
            entry("b", "F", 3.0),
            entry("b", "G", 4.0),
            entry("a", "F", 1.0),
        ];
        let refs: Vec<&TimeEntry> = entries.iter().collect();
        let rows = productivity(&people, &refs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bob");
        assert_eq!(rows[0].total_hours, 7.0);
        assert_eq!(rows[0].folder_count, 2);
        assert_eq!(rows[1].total_hours, 3.0);
        assert_eq!(rows[1].folder_count, 1);
    }

    #[test]
    fn presence_rate_rounds_and_handles_empty_roster() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let people = vec![person("a", "A"), person("b", "B"), person("c", "C")];
        let attendance = vec![
            Attendance {
                id: "1".into(),
                person_id: "a ".into(),
                date: day,
                check_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                check_out: None,
            },
            Attendance {
                id: "2".into(),
                person_id: "b".into(),
                date: day.pred_opt().unwrap(),
                check_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                check_out: None,
            },
        ];
        let summary = presence(&people, &attendance, day);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.rate, 33);
        assert_eq!(presence(&[], &attendance, day).rate, 0);
    }
}
