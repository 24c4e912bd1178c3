pub mod attendance;
pub mod folder;
pub mod person;
pub mod snapshot;
pub mod task;
pub mod time_entry;

use chrono::{NaiveDate, NaiveTime};

/// Compares two record identifiers the way the store expects: surrounding
/// whitespace is not significant.
pub fn same_id(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Reads a calendar date written either as `2025-03-10` or `10/03/2025`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Reads a time of day written as `09:00` or `09:00:00`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}
