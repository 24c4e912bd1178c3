use crate::model::attendance::Attendance;
use crate::model::person::Person;
use crate::model::same_id;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes after the scheduled start that still count as on time.
pub const GRACE_MINUTES: i64 = 5;

fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

pub fn is_late(scheduled_start: NaiveTime, check_in: NaiveTime) -> bool {
    minutes_since_midnight(check_in) - minutes_since_midnight(scheduled_start) > GRACE_MINUTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    #[default]
    All,
}

impl TimeRange {
    /// `Week` is the rolling window of the 7 calendar days ending `today`.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            TimeRange::Day => date == today,
            TimeRange::Week => date <= today && date > today - Duration::days(7),
            TimeRange::Month => date.year() == today.year() && date.month() == today.month(),
            TimeRange::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunctualityReport {
    pub count: usize,
    pub late: usize,
    /// `None` when there is nothing to rate; shown as a placeholder.
    pub on_time_rate: Option<u32>,
}

/// Punctuality of `people` over their attendance records inside `range`.
/// Records of people missing from `people` are ignored, since their
/// schedule is unknown.
pub fn punctuality(
    people: &[&Person],
    attendance: &[Attendance],
    range: TimeRange,
    today: NaiveDate,
) -> PunctualityReport {
    let mut count = 0;
    let mut late = 0;
    for record in attendance.iter().filter(|a| range.contains(a.date, today)) {
        let Some(person) = people.iter().find(|p| same_id(&p.id, &record.person_id)) else {
            continue;
        };
        count += 1;
        if is_late(person.start_time, record.check_in) {
            late += 1;
        }
    }
    PunctualityReport {
        count,
        late,
        on_time_rate: on_time_rate(count, late),
    }
}

pub fn on_time_rate(count: usize, late: usize) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let on_time = count.saturating_sub(late) as f64;
    Some((100.0 * on_time / count as f64).round() as u32)
}
