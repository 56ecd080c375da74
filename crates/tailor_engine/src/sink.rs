use std::sync::mpsc;

use tailor_core::{BatchView, JobResult, OrchestrationError};

/// What the presentation layer hears about a running batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Progress(BatchView),
    Completed(Vec<JobResult>),
    Failed(OrchestrationError),
}

pub trait BatchSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

impl<F> BatchSink for F
where
    F: Fn(BatchEvent) + Send + Sync,
{
    fn emit(&self, event: BatchEvent) {
        self(event)
    }
}

pub struct ChannelBatchSink {
    tx: mpsc::Sender<BatchEvent>,
}

impl ChannelBatchSink {
    pub fn new(tx: mpsc::Sender<BatchEvent>) -> Self {
        Self { tx }
    }
}

impl BatchSink for ChannelBatchSink {
    fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }
}

/// Separate callbacks for each event kind.
pub struct CallbackSink<P, C, E> {
    pub on_progress: P,
    pub on_complete: C,
    pub on_error: E,
}

impl<P, C, E> BatchSink for CallbackSink<P, C, E>
where
    P: Fn(BatchView) + Send + Sync,
    C: Fn(Vec<JobResult>) + Send + Sync,
    E: Fn(OrchestrationError) + Send + Sync,
{
    fn emit(&self, event: BatchEvent) {
        match event {
            BatchEvent::Progress(view) => (self.on_progress)(view),
            BatchEvent::Completed(results) => (self.on_complete)(results),
            BatchEvent::Failed(error) => (self.on_error)(error),
        }
    }
}
