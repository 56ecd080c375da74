use std::time::Duration;

use crate::{BatchId, BatchView, JobResult, OrchestrationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Query the status of `id` after `delay`.
    SchedulePoll { id: BatchId, delay: Duration },
    /// Fetch the result set of a completed batch.
    LoadResults { id: BatchId },
    /// Wait `grace`, then look for an already finished job to adopt.
    StartRecovery { grace: Duration },
    /// Hand a progress snapshot to the presentation layer.
    Progress(BatchView),
    /// Record usage for the batch; emitted at most once per batch.
    MarkAccounted { id: BatchId },
    /// Hand the final result set to the presentation layer.
    Deliver(Vec<JobResult>),
    /// Report a terminal error to the presentation layer.
    Report(OrchestrationError),
}
