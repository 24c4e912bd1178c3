use crate::model::person::Department;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store token meaning "every person of the Audit department".
pub const POOL_AUDIT_TOKEN: &str = "POLE_AUDIT";
/// Store token meaning "every person of the Expertise department".
pub const POOL_EXPERTISE_TOKEN: &str = "POLE_EXPERTISE";

/// Department pools a task can be handed to as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pool {
    Audit,
    Expertise,
}

impl Pool {
    pub fn department(&self) -> Department {
        match self {
            Pool::Audit => Department::Audit,
            Pool::Expertise => Department::Expertise,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Pool::Audit => POOL_AUDIT_TOKEN,
            Pool::Expertise => POOL_EXPERTISE_TOKEN,
        }
    }

    fn from_token(token: &str) -> Option<Pool> {
        match token {
            POOL_AUDIT_TOKEN => Some(Pool::Audit),
            POOL_EXPERTISE_TOKEN => Some(Pool::Expertise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Assignee {
    Individual(String),
    Pool(Pool),
}

impl Assignee {
    fn token(&self) -> &str {
        match self {
            Assignee::Individual(id) => id.trim(),
            Assignee::Pool(pool) => pool.token(),
        }
    }
}

/// Parses the comma-joined assignee column. Empty tokens are dropped and
/// duplicates are kept only once, in first-seen order.
pub fn parse_assignees(raw: &str) -> Vec<Assignee> {
    let mut assignees: Vec<Assignee> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let assignee = match Pool::from_token(token) {
            Some(pool) => Assignee::Pool(pool),
            None => Assignee::Individual(token.to_string()),
        };
        if !assignees.contains(&assignee) {
            assignees.push(assignee);
        }
    }
    assignees
}

pub fn join_assignees(assignees: &[Assignee]) -> String {
    assignees
        .iter()
        .map(Assignee::token)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    Urgent,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
            Urgency::Critical => "critical",
        }
    }

    /// Unknown values read back from the store fall back to `Normal`.
    pub fn from_store(raw: &str) -> Urgency {
        match raw.trim().to_lowercase().as_str() {
            "urgent" => Urgency::Urgent,
            "critical" => Urgency::Critical,
            _ => Urgency::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
        }
    }

    pub fn from_store(raw: &str) -> TaskStatus {
        if raw.trim().eq_ignore_ascii_case("done") {
            TaskStatus::Done
        } else {
            TaskStatus::Todo
        }
    }

    pub fn toggled(&self) -> TaskStatus {
        match self {
            TaskStatus::Todo => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: String,
    pub title: String,
    pub assignees: Vec<Assignee>,
    pub creator_id: String,
    pub department: Option<Department>,
    pub deadline: Option<NaiveDate>,
    pub urgency: Urgency,
    pub status: TaskStatus,
    pub fiscal_year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskForm {
    pub id: Option<String>,
    pub title: String,
    pub assignees: Vec<Assignee>,
    pub department: Option<Department>,
    pub deadline: Option<NaiveDate>,
    #[serde(default = "default_urgency")]
    pub urgency: Urgency,
    pub fiscal_year: Option<String>,
}

fn default_urgency() -> Urgency {
    Urgency::Normal
}
