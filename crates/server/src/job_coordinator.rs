//! Runs a rating job to completion on a blocking thread, updating the
//! job queue's status as it goes and stashing the result for retrieval.
//! The scoring pipeline is pure CPU work, so it belongs on
//! `spawn_blocking` rather than tying up an async worker thread.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rating_core::aggregate::{aggregate, cascade, trigger_scenes, AggregateScores, AggregatorConfig, TriggerScene};
use rating_core::model::{RatingJob, ScoredScene};
use rating_core::score_scenes;
use uuid::Uuid;

use crate::job_queue::JobQueue;

/// Outcome of a completed rating job.
#[derive(Debug, Clone)]
pub struct RatingOutcome {
    pub scenes: Vec<ScoredScene>,
    pub aggregate: AggregateScores,
    pub rating: rating_core::Rating,
    pub reasons: Vec<String>,
    pub top_trigger_scenes: Vec<TriggerScene>,
}

/// Bundles the job queue with a results map, so callers can both check a
/// job's status and fetch its outcome once complete.
pub struct JobCoordinator {
    queue: Arc<dyn JobQueue>,
    results: Mutex<HashMap<Uuid, RatingOutcome>>,
}

impl JobCoordinator {
    pub fn new(queue: Arc<dyn JobQueue>) -> Arc<Self> {
        Arc::new(Self {
            queue,
            results: Mutex::new(HashMap::new()),
        })
    }

    pub fn get_job(&self, job_id: Uuid) -> Option<RatingJob> {
        self.queue.get(job_id)
    }

    pub fn get_result(&self, job_id: Uuid) -> Option<RatingOutcome> {
        self.results.lock().get(&job_id).cloned()
    }

    /// Jobs currently queued or running, for the metrics endpoint.
    pub fn active_count(&self) -> usize {
        self.queue.active_count()
    }

    /// Total jobs tracked since startup, for the metrics endpoint.
    pub fn total_count(&self) -> usize {
        self.queue.total_count()
    }

    /// Submit `text` for scoring under `script_id`'s single-flight slot.
    /// Returns the job immediately; the caller polls [`Self::get_job`]
    /// and [`Self::get_result`] for completion.
    pub async fn submit(self: &Arc<Self>, script_id: Uuid, text: String, config: AggregatorConfig) -> RatingJob {
        let job = self.queue.enqueue(script_id);
        if job.status != rating_core::model::JobStatus::Queued {
            return job;
        }

        let job_id = job.id;
        self.queue.mark_running(job_id);

        let this = Arc::clone(self);
        tokio::task::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || run_pipeline(&text, config)).await;

            match outcome {
                Ok(outcome) => {
                    this.results.lock().insert(job_id, outcome);
                    this.queue.mark_completed(job_id);
                }
                Err(join_err) => {
                    this.queue.mark_failed(job_id, join_err.to_string());
                }
            }
        });

        job
    }
}

fn run_pipeline(text: &str, config: AggregatorConfig) -> RatingOutcome {
    let scenes = score_scenes(text);
    let dims: Vec<_> = scenes.iter().map(|s| s.scores).collect();
    let agg = aggregate(&dims, config);
    let result = cascade(&agg);
    let top_trigger_scenes = trigger_scenes(&scenes);

    RatingOutcome {
        scenes,
        aggregate: agg,
        rating: result.rating,
        reasons: result.reasons,
        top_trigger_scenes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_queue::InMemoryJobQueue;

    #[tokio::test]
    async fn submitting_twice_for_the_same_script_reuses_the_job() {
        let coordinator = JobCoordinator::new(InMemoryJobQueue::new());
        let script_id = Uuid::new_v4();
        let first = coordinator
            .submit(script_id, "INT. ROOM - DAY\n\nNothing happens.".to_string(), AggregatorConfig::Hybrid)
            .await;
        let second = coordinator
            .submit(script_id, "INT. ROOM - DAY\n\nNothing happens.".to_string(), AggregatorConfig::Hybrid)
            .await;
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn run_pipeline_produces_a_deterministic_rating_for_empty_text() {
        let outcome = run_pipeline("", AggregatorConfig::Hybrid);
        assert!(outcome.scenes.is_empty());
        assert_eq!(outcome.rating, rating_core::Rating::Zero);
    }
}
