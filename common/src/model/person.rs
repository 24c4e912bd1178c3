use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organisational service line. Also used as the service type of folders and
/// time entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    Audit,
    Expertise,
    Legal,
    Social,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Audit => "Audit",
            Department::Expertise => "Expertise",
            Department::Legal => "Legal",
            Department::Social => "Social",
        }
    }

    pub fn is_audit(&self) -> bool {
        matches!(self, Department::Audit)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    /// Accepts the English names in any case, plus the labels found in older
    /// spreadsheets ("Juridique").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audit" => Ok(Department::Audit),
            "expertise" => Ok(Department::Expertise),
            "legal" | "juridique" => Ok(Department::Legal),
            "social" => Ok(Department::Social),
            other => Err(format!("unknown department '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Collaborator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Collaborator => "Collaborator",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "collaborator" | "collaborateur" => Ok(Role::Collaborator),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

/// A member of the firm.
///
/// The PIN digest never leaves the backend: it is skipped when a person is
/// serialized into an API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub department: Department,
    pub role: Role,
    pub hire_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(skip)]
    pub pin_hash: String,
}

impl Person {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload of the person form. `id` is absent on creation; `pin` is absent
/// when an existing person is edited without changing their PIN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonForm {
    pub id: Option<String>,
    pub name: String,
    pub department: Department,
    pub role: Role,
    pub hire_date: Option<NaiveDate>,
    #[serde(default = "default_start_time")]
    pub start_time: NaiveTime,
    #[serde(default = "default_end_time")]
    pub end_time: NaiveTime,
    pub pin: Option<String>,
}
