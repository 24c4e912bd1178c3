use crate::rules::import::ImportReport;
use serde::{Deserialize, Serialize};

/// Lifecycle of a background import verification, as polled by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Number of data rows checked so far.
    InProgress(u32),
    Completed(ImportReport),
    Failed(String),
}

impl JobStatus {
    /// True once the job has stopped producing updates.
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed(_) | JobStatus::Failed(_))
    }
}
