//! Progress of spreadsheet imports running outside the request cycle.
//!
//! Workers never touch the job map directly: they push `JobUpdate`s into the
//! channel and `start_job_updater` applies them, so status polls only ever
//! take a read lock. Finished jobs stay readable for `FINISHED_RETENTION`
//! and are dropped on the next write after that.

use common::jobs::JobStatus;
use log::debug;
use std::time::{Duration, Instant};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

const CHANNEL_CAPACITY: usize = 100;
const FINISHED_RETENTION: Duration = Duration::from_secs(15 * 60);

struct TrackedJob {
    status: JobStatus,
    finished_at: Option<Instant>,
}

type JobMap = HashMap<String, TrackedJob>;

#[derive(Clone)]
pub struct JobsState {
    jobs: Arc<RwLock<JobMap>>,
    retention: Duration,
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// A fresh state plus the receiving end to hand to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        Self::with_retention(FINISHED_RETENTION)
    }

    pub fn with_retention(retention: Duration) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retention,
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending` and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        let mut jobs = self.jobs.write().await;
        evict_finished(&mut jobs, self.retention);
        jobs.insert(
            job_id.clone(),
            TrackedJob {
                status: JobStatus::Pending,
                finished_at: None,
            },
        );
        job_id
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).map(|job| job.status.clone())
    }

    async fn apply(&self, update: JobUpdate) {
        let mut jobs = self.jobs.write().await;
        evict_finished(&mut jobs, self.retention);
        let finished_at = update.status.is_finished().then(Instant::now);
        jobs.insert(
            update.job_id,
            TrackedJob {
                status: update.status,
                finished_at,
            },
        );
    }
}

fn evict_finished(jobs: &mut JobMap, retention: Duration) {
    jobs.retain(|job_id, job| match job.finished_at {
        Some(at) if at.elapsed() >= retention => {
            debug!("Dropping finished job {}", job_id);
            false
        }
        _ => true,
    });
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies updates until every sender is gone.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        debug!("Job {} -> {:?}", update.job_id, update.status);
        state.apply(update).await;
    }
}
