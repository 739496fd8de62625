//! Single-flight job tracking for asynchronous rating runs.
//!
//! There is no external broker here — the original service used Redis/RQ
//! to hand work to separate worker processes, but this server runs the
//! whole pipeline in-process. [`InMemoryJobQueue`] gives the same
//! single-flight-per-script guarantee with a plain mutexed map instead of
//! any external queue technology.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rating_core::model::{JobStatus, RatingJob};
use uuid::Uuid;

/// Abstract job tracking surface, so the coordinator and routes don't
/// depend on the in-memory implementation directly.
pub trait JobQueue: Send + Sync {
    /// Start a job for `script_id` if one isn't already in flight,
    /// returning the existing job instead of creating a duplicate.
    fn enqueue(&self, script_id: Uuid) -> RatingJob;

    fn get(&self, job_id: Uuid) -> Option<RatingJob>;

    fn mark_running(&self, job_id: Uuid);

    fn mark_completed(&self, job_id: Uuid);

    fn mark_failed(&self, job_id: Uuid, error: String);

    /// Number of jobs currently queued or running, for the metrics endpoint.
    fn active_count(&self) -> usize;

    /// Total number of jobs tracked since startup (any status).
    fn total_count(&self) -> usize;
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<Uuid, RatingJob>,
    active_by_script: HashMap<Uuid, Uuid>,
}

/// In-process job queue. One active (queued or running) job per script
/// at a time; a second enqueue for the same script returns the job
/// already in flight instead of starting another.
pub struct InMemoryJobQueue {
    inner: Mutex<Inner>,
}

impl InMemoryJobQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
        })
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, script_id: Uuid) -> RatingJob {
        let mut inner = self.inner.lock();

        if let Some(existing_id) = inner.active_by_script.get(&script_id) {
            if let Some(job) = inner.jobs.get(existing_id) {
                if matches!(job.status, JobStatus::Queued | JobStatus::InProgress) {
                    return job.clone();
                }
            }
        }

        let job = RatingJob::new(script_id, chrono::Utc::now());
        inner.active_by_script.insert(script_id, job.id);
        inner.jobs.insert(job.id, job.clone());
        job
    }

    fn get(&self, job_id: Uuid) -> Option<RatingJob> {
        self.inner.lock().jobs.get(&job_id).cloned()
    }

    fn mark_running(&self, job_id: Uuid) {
        let mut inner = self.inner.lock();
        if let Some(job) = inner.jobs.get_mut(&job_id) {
            job.status = JobStatus::InProgress;
        }
    }

    fn mark_completed(&self, job_id: Uuid) {
        let mut inner = self.inner.lock();
        let script_id = inner.jobs.get(&job_id).map(|j| j.script_id);
        if let Some(job) = inner.jobs.get_mut(&job_id) {
            job.status = JobStatus::Completed;
            job.finished_at = Some(chrono::Utc::now());
        }
        if let Some(script_id) = script_id {
            inner.active_by_script.remove(&script_id);
        }
    }

    fn mark_failed(&self, job_id: Uuid, error: String) {
        let mut inner = self.inner.lock();
        let script_id = inner.jobs.get(&job_id).map(|j| j.script_id);
        if let Some(job) = inner.jobs.get_mut(&job_id) {
            job.status = JobStatus::Failed;
            job.error = Some(error);
            job.finished_at = Some(chrono::Utc::now());
        }
        if let Some(script_id) = script_id {
            inner.active_by_script.remove(&script_id);
        }
    }

    fn active_count(&self) -> usize {
        self.inner.lock().active_by_script.len()
    }

    fn total_count(&self) -> usize {
        self.inner.lock().jobs.len()
    }
}
