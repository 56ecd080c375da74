use std::time::Duration;

use chrono::{DateTime, Utc};
use tailor_core::{BatchJob, Msg, RemoteState};
use tailor_logging::{tailor_info, tailor_warn};

use crate::{BatchApi, JobSummary};

/// Which listed jobs may plausibly be the batch that lost track of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryScope {
    /// Jobs last updated before this instant predate the batch.
    pub not_before: DateTime<Utc>,
    /// Number of postings submitted; listed jobs reporting another count are skipped.
    pub expected_total: u32,
}

impl RecoveryScope {
    pub fn for_job(job: &BatchJob, clock_skew: Duration) -> Self {
        let skew = chrono::Duration::from_std(clock_skew)
            .unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            not_before: job.created_at() - skew,
            expected_total: job.total(),
        }
    }

    fn admits(&self, job: &JobSummary) -> bool {
        let recent = job
            .updated_at
            .is_some_and(|updated_at| updated_at >= self.not_before);
        let same_size = job
            .total_jobs
            .is_none_or(|total| total == self.expected_total);
        job.state == RemoteState::Completed && recent && same_size
    }
}

/// The most recently updated completed job within scope.
pub fn select_candidate<'a>(
    jobs: &'a [JobSummary],
    scope: &RecoveryScope,
) -> Option<&'a JobSummary> {
    jobs.iter()
        .filter(|job| scope.admits(job))
        .max_by_key(|job| job.updated_at)
}

/// Looks for an already finished job to adopt instead of resubmitting.
pub(crate) async fn recover(api: &dyn BatchApi, job: &BatchJob, clock_skew: Duration) -> Msg {
    let scope = RecoveryScope::for_job(job, clock_skew);
    tailor_info!(
        "Recovering batch {}: listing jobs updated since {}",
        job.id(),
        scope.not_before.to_rfc3339()
    );
    let jobs = match api.list_jobs().await {
        Ok(jobs) => jobs,
        Err(err) => {
            tailor_warn!("Recovery listing failed for batch {}: {}", job.id(), err);
            return Msg::RecoveryFailed(err.message());
        }
    };

    match select_candidate(&jobs, &scope) {
        Some(candidate) => {
            tailor_info!(
                "Recovery adopting batch {} (was {}) out of {} listed",
                candidate.id,
                job.id(),
                jobs.len()
            );
            Msg::RecoveryAdopted(candidate.id.clone())
        }
        None => {
            tailor_warn!(
                "Recovery found no completed batch among {} listed jobs",
                jobs.len()
            );
            Msg::RecoveryFailed("no completed batch was found".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tailor_core::BatchId;

    use super::*;

    fn summary(id: &str, state: RemoteState, minute: u32, total: Option<u32>) -> JobSummary {
        JobSummary {
            id: BatchId::new(id),
            state,
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()),
            total_jobs: total,
            completed_jobs: None,
            failed_jobs: None,
        }
    }

    fn scope() -> RecoveryScope {
        RecoveryScope {
            not_before: Utc.with_ymd_and_hms(2024, 5, 1, 12, 10, 0).unwrap(),
            expected_total: 3,
        }
    }

    #[test]
    fn picks_most_recent_completed_job() {
        let jobs = vec![
            summary("old", RemoteState::Completed, 20, Some(3)),
            summary("newest-running", RemoteState::Processing, 40, Some(3)),
            summary("new", RemoteState::Completed, 30, None),
        ];
        assert_eq!(
            select_candidate(&jobs, &scope()).map(|job| job.id.as_str()),
            Some("new")
        );
    }

    #[test]
    fn skips_jobs_outside_scope() {
        let jobs = vec![
            summary("before-submit", RemoteState::Completed, 5, Some(3)),
            summary("other-size", RemoteState::Completed, 30, Some(7)),
            JobSummary {
                updated_at: None,
                ..summary("undated", RemoteState::Completed, 30, Some(3))
            },
        ];
        assert!(select_candidate(&jobs, &scope()).is_none());
    }
}
