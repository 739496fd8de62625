//! Core data model: the persisted/transferred shapes that sit above the
//! pure scoring pipeline (script, versions, rating logs, jobs,
//! modifications).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::AggregateScores;
use crate::normalize::DimensionScores;
use crate::units::Rating;

/// A screenplay as submitted for rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub id: Uuid,
    pub title: String,
    pub raw_text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A scored scene: the segmented text plus its normalized dimension
/// scores and ranking weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredScene {
    pub scene_id: u32,
    pub heading: String,
    pub scores: DimensionScores,
    pub weight: f64,
    /// First ~400 characters of the scene body, newlines collapsed to
    /// spaces, for display in trigger-scene and problem-scene summaries.
    pub sample_text: String,
}

/// An immutable snapshot of a script's text at a point in time.
///
/// Exactly one version per script has `is_current == true`; callers
/// create a new version, then atomically flip the previous current
/// version off before marking the new one current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptVersion {
    pub id: Uuid,
    pub script_id: Uuid,
    pub version_number: u32,
    pub text: String,
    pub is_current: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Human-readable note on why this version was created (e.g. which
    /// modification produced it).
    pub label: Option<String>,
}

/// A single completed rating run, kept for history/audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingLog {
    pub id: Uuid,
    pub script_id: Uuid,
    pub version_id: Uuid,
    pub rating: Rating,
    pub aggregate: AggregateScores,
    pub reasons: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Status of an asynchronous rating job, matching the queue backend's
/// status vocabulary (spec.md §6: `queued, deferred, in_progress,
/// completed, failed, not_found`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    /// Accepted but not yet picked up for execution — a queue-backend
    /// state this single-process coordinator never actually produces
    /// (there's no separate worker pool to defer to) but is carried so
    /// the status vocabulary matches the abstract queue contract.
    Deferred,
    InProgress,
    Completed,
    Failed,
    /// The job id is unknown to the backend (expired, never existed).
    NotFound,
}

/// A rating job tracked by the job coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingJob {
    pub id: Uuid,
    pub script_id: Uuid,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl RatingJob {
    pub fn new(script_id: Uuid, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            script_id,
            status: JobStatus::Queued,
            error: None,
            created_at,
            finished_at: None,
        }
    }
}

/// A recorded application of a modification strategy to a script version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modification {
    pub id: Uuid,
    pub script_id: Uuid,
    pub strategy: String,
    pub params: serde_json::Value,
    pub source_version_id: Uuid,
    pub result_version_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_job_starts_queued_with_no_error() {
        let job = RatingJob::new(Uuid::new_v4(), chrono::Utc::now());
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.error.is_none());
        assert!(job.finished_at.is_none());
    }
}
