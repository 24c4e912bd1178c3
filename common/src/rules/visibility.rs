//! Who sees which task, and who may change it.
//!
//! A person is *responsible* for a task when they are named in its assignee
//! list or when their department's pool is. A task is *private* when its only
//! assignee is its creator. Only the creator may edit, reassign or delete a
//! task; anyone who sees it in the `all` tab may toggle its status.

use crate::model::person::Person;
use crate::model::same_id;
use crate::model::task::{Assignee, TaskAssignment, TaskStatus};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTab {
    #[default]
    All,
    Mine,
    Received,
    Delegated,
}

/// A task as presented to one acting person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub task: TaskAssignment,
    pub can_edit: bool,
    pub near_deadline: bool,
}

pub fn is_responsible(task: &TaskAssignment, person: &Person) -> bool {
    task.assignees.iter().any(|assignee| match assignee {
        Assignee::Individual(id) => same_id(id, &person.id),
        Assignee::Pool(pool) => pool.department() == person.department,
    })
}

pub fn is_creator(task: &TaskAssignment, person: &Person) -> bool {
    same_id(&task.creator_id, &person.id)
}

pub fn is_private(task: &TaskAssignment) -> bool {
    match task.assignees.as_slice() {
        [Assignee::Individual(id)] => same_id(id, &task.creator_id),
        _ => false,
    }
}

pub fn can_edit(task: &TaskAssignment, person: &Person) -> bool {
    is_creator(task, person)
}

pub fn in_tab(task: &TaskAssignment, person: &Person, tab: TaskTab) -> bool {
    let creator = is_creator(task, person);
    match tab {
        TaskTab::All if person.is_admin() => creator || !is_private(task),
        TaskTab::All => creator || is_responsible(task, person),
        TaskTab::Mine => creator && is_responsible(task, person),
        TaskTab::Received => !creator && is_responsible(task, person),
        TaskTab::Delegated => creator && !is_private(task),
    }
}

/// Anyone who can see the task in the `all` tab may flip its status.
pub fn can_toggle(task: &TaskAssignment, person: &Person) -> bool {
    in_tab(task, person, TaskTab::All)
}

/// True while an open task's deadline (taken at midnight) lies between now
/// and 24 hours from now.
pub fn is_near_deadline(task: &TaskAssignment, now: NaiveDateTime) -> bool {
    if task.status == TaskStatus::Done {
        return false;
    }
    let Some(deadline) = task.deadline.and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return false;
    };
    let remaining = deadline - now;
    remaining >= Duration::zero() && remaining <= Duration::hours(24)
}

/// Tasks of `tab` for `person`: open tasks first, then by urgency, highest
/// first. Ties keep their input order.
pub fn visible_tasks(
    tasks: &[&TaskAssignment],
    person: &Person,
    tab: TaskTab,
    now: NaiveDateTime,
) -> Vec<TaskView> {
    let mut views: Vec<TaskView> = tasks
        .iter()
        .filter(|task| in_tab(task, person, tab))
        .map(|task| TaskView {
            task: (*task).clone(),
            can_edit: can_edit(task, person),
            near_deadline: is_near_deadline(task, now),
        })
        .collect();
    views.sort_by(|a, b| {
        let done_a = a.task.status == TaskStatus::Done;
        let done_b = b.task.status == TaskStatus::Done;
        done_a
            .cmp(&done_b)
            .then_with(|| b.task.urgency.cmp(&a.task.urgency))
    });
    views
}
