use std::fmt;

use chrono::{DateTime, Utc};

/// Server-assigned batch job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BatchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Failed | BatchState::TimedOut
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchState::Submitted => "submitted",
            BatchState::Polling => "polling",
            BatchState::Completed => "completed",
            BatchState::Failed => "failed",
            BatchState::TimedOut => "timed out",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid batch transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: BatchState,
    pub to: BatchState,
}

/// State reported by the processing service for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Pending,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl RemoteState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => RemoteState::Pending,
            "processing" | "running" => RemoteState::Processing,
            "completed" | "complete" | "done" => RemoteState::Completed,
            "failed" | "error" => RemoteState::Failed,
            _ => RemoteState::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteState::Pending => f.write_str("pending"),
            RemoteState::Processing => f.write_str("processing"),
            RemoteState::Completed => f.write_str("completed"),
            RemoteState::Failed => f.write_str("failed"),
            RemoteState::Other(raw) => f.write_str(raw),
        }
    }
}

/// One status poll answer, already decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub state: RemoteState,
    pub total: Option<u32>,
    pub completed: Option<u32>,
    pub failed: Option<u32>,
    pub current_job: Option<String>,
    pub message: Option<String>,
}

impl StatusReport {
    pub fn new(state: RemoteState) -> Self {
        Self {
            state,
            total: None,
            completed: None,
            failed: None,
            current_job: None,
            message: None,
        }
    }

    pub fn with_counts(mut self, total: u32, completed: u32, failed: u32) -> Self {
        self.total = Some(total);
        self.completed = Some(completed);
        self.failed = Some(failed);
        self
    }
}

/// Client-side view of a server batch job.
///
/// `completed + failed <= total` holds after every mutation, and terminal
/// states are only left through [`BatchJob::adopt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    id: BatchId,
    state: BatchState,
    total: u32,
    completed: u32,
    failed: u32,
    current_job_label: Option<String>,
    created_at: DateTime<Utc>,
}

impl BatchJob {
    pub fn submitted(id: BatchId, total: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            state: BatchState::Submitted,
            total,
            completed: 0,
            failed: 0,
            current_job_label: None,
            created_at,
        }
    }

    pub fn id(&self) -> &BatchId {
        &self.id
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn current_job_label(&self) -> Option<&str> {
        self.current_job_label.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn transition(&mut self, to: BatchState) -> Result<(), InvalidTransition> {
        let from = self.state;
        let allowed = match (from, to) {
            (BatchState::Submitted, BatchState::Polling) => true,
            (BatchState::Submitted | BatchState::Polling, next) => next.is_terminal(),
            _ => false,
        };
        if !allowed {
            return Err(InvalidTransition { from, to });
        }
        self.state = to;
        Ok(())
    }

    /// Re-targets a timed-out batch at a job discovered on the server.
    pub(crate) fn adopt(&mut self, id: BatchId) -> Result<(), InvalidTransition> {
        if self.state != BatchState::TimedOut {
            return Err(InvalidTransition {
                from: self.state,
                to: BatchState::Polling,
            });
        }
        self.id = id;
        self.state = BatchState::Polling;
        Ok(())
    }

    /// Applies reported counters, clamping so the counter invariant holds.
    /// A missing or zero total keeps the locally known total.
    pub(crate) fn apply_report(&mut self, report: &StatusReport) {
        if let Some(total) = report.total.filter(|total| *total > 0) {
            self.total = total;
        }
        let completed = report.completed.unwrap_or(self.completed).min(self.total);
        let failed = report
            .failed
            .unwrap_or(self.failed)
            .min(self.total - completed);
        self.completed = completed;
        self.failed = failed;
        if let Some(label) = report.current_job.as_deref() {
            let label = label.trim();
            self.current_job_label = (!label.is_empty()).then(|| label.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> BatchJob {
        BatchJob::submitted(BatchId::new("b-1"), 3, Utc::now())
    }

    #[test]
    fn counters_are_clamped_to_total() {
        let mut job = job();
        job.apply_report(&StatusReport::new(RemoteState::Processing).with_counts(3, 2, 5));
        assert_eq!((job.total(), job.completed(), job.failed()), (3, 2, 1));

        job.apply_report(&StatusReport::new(RemoteState::Processing).with_counts(0, 9, 0));
        assert_eq!((job.total(), job.completed(), job.failed()), (3, 3, 0));
    }

    #[test]
    fn terminal_states_do_not_return_to_polling() {
        let mut job = job();
        job.transition(BatchState::Polling).unwrap();
        job.transition(BatchState::Completed).unwrap();
        assert!(job.transition(BatchState::Polling).is_err());
        assert!(job.transition(BatchState::Failed).is_err());
        assert!(job.adopt(BatchId::new("other")).is_err());
        assert_eq!(job.id().as_str(), "b-1");
    }

    #[test]
    fn adopt_only_from_timed_out() {
        let mut job = job();
        job.transition(BatchState::Polling).unwrap();
        job.transition(BatchState::TimedOut).unwrap();
        job.adopt(BatchId::new("b-2")).unwrap();
        assert_eq!(job.state(), BatchState::Polling);
        assert_eq!(job.id().as_str(), "b-2");
    }

    #[test]
    fn remote_state_parsing_is_lenient() {
        assert_eq!(RemoteState::parse(" Completed "), RemoteState::Completed);
        assert_eq!(RemoteState::parse("pending"), RemoteState::Pending);
        assert_eq!(
            RemoteState::parse("paused"),
            RemoteState::Other("paused".to_string())
        );
    }
}
