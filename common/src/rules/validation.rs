use crate::model::folder::FolderForm;
use crate::model::person::PersonForm;
use crate::model::task::TaskForm;
use crate::model::time_entry::EntryForm;
use regex::Regex;
use std::sync::LazyLock;

static PIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid PIN pattern"));

/// Reasons a form is refused before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("hours must be a positive number")]
    NonPositiveHours,
    #[error("budget cannot be negative")]
    NegativeBudget,
    #[error("PIN must be exactly 4 digits")]
    PinFormat,
    #[error("PIN does not match")]
    PinMismatch,
    #[error("a task needs at least one assignee")]
    NoAssignee,
    #[error("end of day must come after start of day")]
    ScheduleOrder,
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if PIN_RE.is_match(pin) {
        Ok(())
    } else {
        Err(ValidationError::PinFormat)
    }
}

/// A new person must come with a PIN; an edited one keeps theirs when the
/// field is left empty.
pub fn validate_person(form: &PersonForm) -> Result<(), ValidationError> {
    required(&form.name, "name")?;
    if form.end_time <= form.start_time {
        return Err(ValidationError::ScheduleOrder);
    }
    match (form.id.as_deref(), form.pin.as_deref().filter(|p| !p.is_empty())) {
        (_, Some(pin)) => validate_pin(pin),
        (None, None) => Err(ValidationError::Required("pin")),
        (Some(_), None) => Ok(()),
    }
}

pub fn validate_folder(form: &FolderForm) -> Result<(), ValidationError> {
    required(&form.name, "name")?;
    if !form.budget_hours.is_finite() || form.budget_hours < 0.0 {
        return Err(ValidationError::NegativeBudget);
    }
    Ok(())
}

pub fn validate_entry(form: &EntryForm) -> Result<(), ValidationError> {
    if !form.hours.is_finite() || form.hours <= 0.0 {
        return Err(ValidationError::NonPositiveHours);
    }
    required(form.folder_id.as_deref().unwrap_or_default(), "folder")
}

pub fn validate_task(form: &TaskForm) -> Result<(), ValidationError> {
    required(&form.title, "title")?;
    if form.assignees.is_empty() {
        return Err(ValidationError::NoAssignee);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::{Department, Role, default_end_time, default_start_time};

    fn person_form(id: Option<&str>, pin: Option<&str>) -> PersonForm {
        PersonForm {
            id: id.map(String::from),
            name: "Alice".into(),
            department: Department::Audit,
            role: Role::Collaborator,
            hire_date: None,
            start_time: default_start_time(),
            end_time: default_end_time(),
            pin: pin.map(String::from),
        }
    }

    #[test]
    fn pin_must_be_four_digits() {
        assert_eq!(validate_pin("1234"), Ok(()));
        assert_eq!(validate_pin("123"), Err(ValidationError::PinFormat));
        assert_eq!(validate_pin("12a4"), Err(ValidationError::PinFormat));
        assert_eq!(validate_pin("12345"), Err(ValidationError::PinFormat));
    }

    #[test]
    fn new_person_needs_a_pin() {
        assert_eq!(
            validate_person(&person_form(None, None)),
            Err(ValidationError::Required("pin"))
        );
        assert_eq!(validate_person(&person_form(Some("p1"), None)), Ok(()));
        assert_eq!(validate_person(&person_form(Some("p1"), Some(""))), Ok(()));
        assert_eq!(validate_person(&person_form(None, Some("0042"))), Ok(()));
    }

    #[test]
    fn person_schedule_must_be_ordered() {
        let mut form = person_form(None, Some("1111"));
        form.end_time = form.start_time;
        assert_eq!(validate_person(&form), Err(ValidationError::ScheduleOrder));
    }

    #[test]
    fn entry_needs_positive_hours_and_folder() {
        let mut form = EntryForm {
            folder_id: Some("f1".into()),
            hours: 1.5,
            ..Default::default()
        };
        assert_eq!(validate_entry(&form), Ok(()));
        form.hours = 0.0;
        assert_eq!(validate_entry(&form), Err(ValidationError::NonPositiveHours));
        form.hours = 2.0;
        form.folder_id = Some("  ".into());
        assert_eq!(validate_entry(&form), Err(ValidationError::Required("folder")));
    }

    #[test]
    fn folder_budget_cannot_be_negative() {
        let form = FolderForm {
            id: None,
            name: "Closing".into(),
            number: String::new(),
            client: String::new(),
            service: None,
            budget_hours: -1.0,
        };
        assert_eq!(validate_folder(&form), Err(ValidationError::NegativeBudget));
    }
}
