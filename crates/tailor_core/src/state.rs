use std::time::Duration;

use crate::{BatchJob, BatchView, JobResult, JobUrlList, OrchestrationError, PollSettings};

/// How a batch ended, as seen by the task driving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Completed(Vec<JobResult>),
    Failed(OrchestrationError),
    Cancelled,
}

/// Everything the polling state machine owns for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState {
    pub(crate) job: BatchJob,
    pub(crate) urls: JobUrlList,
    pub(crate) settings: PollSettings,
    /// Non-terminal status answers since polling (re)started.
    pub(crate) successes: u32,
    /// Network failures in a row.
    pub(crate) error_attempts: u32,
    /// Unrecognized remote states in a row.
    pub(crate) unknown_answers: u32,
    pub(crate) interval: Duration,
    pub(crate) recovery_attempted: bool,
    pub(crate) results_requested: bool,
    pub(crate) accounted: bool,
    pub(crate) outcome: Option<BatchOutcome>,
    dirty: bool,
}

impl PollerState {
    pub fn new(job: BatchJob, urls: JobUrlList, settings: PollSettings) -> Self {
        let interval = settings.interval_for(0);
        Self {
            job,
            urls,
            settings,
            successes: 0,
            error_attempts: 0,
            unknown_answers: 0,
            interval,
            recovery_attempted: false,
            results_requested: false,
            accounted: false,
            outcome: None,
            dirty: false,
        }
    }

    pub fn job(&self) -> &BatchJob {
        &self.job
    }

    pub fn urls(&self) -> &JobUrlList {
        &self.urls
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Delay that was used for the most recently scheduled tick.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn error_attempts(&self) -> u32 {
        self.error_attempts
    }

    pub fn view(&self) -> BatchView {
        BatchView::from(&self.job)
    }

    pub fn outcome(&self) -> Option<&BatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Option<BatchOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn restart_schedule(&mut self) {
        self.successes = 0;
        self.error_attempts = 0;
        self.unknown_answers = 0;
        self.interval = self.settings.interval_for(0);
    }

    pub(crate) fn finish(&mut self, outcome: BatchOutcome) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
            self.mark_dirty();
        }
    }
}
