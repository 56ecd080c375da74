use crate::{BatchId, BatchJob, BatchState};

/// Snapshot of a batch as rendered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchView {
    pub id: BatchId,
    pub state: BatchState,
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub current_job_label: Option<String>,
    /// Finished share of the batch, 0..=100.
    pub percent: u8,
}

impl From<&BatchJob> for BatchView {
    fn from(job: &BatchJob) -> Self {
        let done = job.completed() + job.failed();
        let percent = if job.total() == 0 {
            0
        } else {
            (u64::from(done) * 100 / u64::from(job.total())) as u8
        };
        Self {
            id: job.id().clone(),
            state: job.state(),
            total: job.total(),
            completed: job.completed(),
            failed: job.failed(),
            current_job_label: job.current_job_label().map(ToOwned::to_owned),
            percent,
        }
    }
}
