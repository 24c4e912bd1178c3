use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Clock-in/clock-out record. At most one per person and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: String,
    pub person_id: String,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
}
