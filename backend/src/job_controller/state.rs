//! Tracks background jobs (currently the subject preview job) so clients can
//! poll their progress after the request that started them has returned.
//!
//! - `JobsState`: clonable handle on the status map plus the sender workers
//!   report through. Injected into the Actix app in `main.rs`.
//! - `JobUpdate`: one status change for one job.
//! - `start_job_updater`: the only writer of the status map; it drains the
//!   channel for the life of the server.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

#[derive(Clone)]
pub struct JobsState {
    /// Job ID -> latest reported status. Read by the status endpoint.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Workers push updates here instead of locking `jobs` themselves.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates the state and the receiver to hand to `start_job_updater`.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies every `JobUpdate` received on `rx` to the shared map.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        log::debug!("Job {} -> {:?}", update.job_id, update.status);
        state.jobs.write().await.insert(update.job_id, update.status);
    }
}
