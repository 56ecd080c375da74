use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tailor_core::{update, BatchId, BatchOutcome, Effect, Msg, PollerState, RemoteState};
use tailor_logging::{tailor_debug, tailor_info, tailor_warn};
use tokio_util::sync::CancellationToken;

use crate::aggregate::load_results;
use crate::recovery::recover;
use crate::{BatchApi, BatchEvent, BatchSink, UsageLedger};

/// Runs the polling state machine for one batch, executing its effects.
pub struct PollLoop {
    api: Arc<dyn BatchApi>,
    sink: Arc<dyn BatchSink>,
    ledger: Arc<UsageLedger>,
    cancel: CancellationToken,
}

impl PollLoop {
    pub fn new(
        api: Arc<dyn BatchApi>,
        sink: Arc<dyn BatchSink>,
        ledger: Arc<UsageLedger>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            sink,
            ledger,
            cancel,
        }
    }

    /// Drives `state` from `Submitted` until the batch outcome is settled.
    pub async fn run(&self, mut state: PollerState) -> BatchOutcome {
        let mut pending = Some(Msg::Start);
        while let Some(msg) = pending.take() {
            let previous = state.job().state();
            let (next, effects) = update(state, msg);
            state = next;
            if state.consume_dirty() {
                let job = state.job();
                if job.state() != previous {
                    tailor_info!("Batch {} {} -> {}", job.id(), previous, job.state());
                } else {
                    tailor_debug!(
                        "Batch {} progress {}/{} failed={}",
                        job.id(),
                        job.completed(),
                        job.total(),
                        job.failed()
                    );
                }
            }
            for effect in effects {
                if let Some(msg) = self.execute(effect, &state).await {
                    pending = Some(msg);
                }
            }
        }

        state.into_outcome().unwrap_or_else(|| {
            tailor_warn!("Poll loop stopped without an outcome");
            BatchOutcome::Cancelled
        })
    }

    async fn execute(&self, effect: Effect, state: &PollerState) -> Option<Msg> {
        match effect {
            Effect::SchedulePoll { id, delay } => Some(self.poll(id, delay).await),
            Effect::LoadResults { id } => Some(
                self.guarded(load_results(self.api.as_ref(), &id, state.urls()))
                    .await
                    .unwrap_or(Msg::Cancelled),
            ),
            Effect::StartRecovery { grace } => Some(self.recover(grace, state).await),
            Effect::Progress(view) => {
                self.sink.emit(BatchEvent::Progress(view));
                None
            }
            Effect::MarkAccounted { id } => {
                self.ledger.mark_accounted(&id).await;
                None
            }
            Effect::Deliver(results) => {
                self.sink.emit(BatchEvent::Completed(results));
                None
            }
            Effect::Report(error) => {
                tailor_warn!("Batch {} ended with error: {}", state.job().id(), error);
                self.sink.emit(BatchEvent::Failed(error));
                None
            }
        }
    }

    async fn poll(&self, id: BatchId, delay: Duration) -> Msg {
        if self.guarded(tokio::time::sleep(delay)).await.is_none() {
            return Msg::Cancelled;
        }
        match self.guarded(self.api.status(&id)).await {
            None => Msg::Cancelled,
            Some(Ok(report)) => {
                if let RemoteState::Other(raw) = &report.state {
                    tailor_warn!("Batch {} reported unrecognized state '{}'", id, raw);
                } else {
                    tailor_debug!("Batch {} reported {}", id, report.state);
                }
                Msg::StatusReceived(report)
            }
            Some(Err(err)) if err.is_transient() => {
                tailor_warn!("Status poll for batch {} failed, retrying: {}", id, err);
                Msg::TransportError(err.to_string())
            }
            Some(Err(err)) => Msg::StatusRejected(err.message()),
        }
    }

    async fn recover(&self, grace: Duration, state: &PollerState) -> Msg {
        if self.guarded(tokio::time::sleep(grace)).await.is_none() {
            return Msg::Cancelled;
        }
        let clock_skew = state.settings().recovery_clock_skew;
        self.guarded(recover(self.api.as_ref(), state.job(), clock_skew))
            .await
            .unwrap_or(Msg::Cancelled)
    }

    /// Runs `future` unless cancelled; output arriving after cancellation is dropped.
    async fn guarded<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            output = future => (!self.cancel.is_cancelled()).then_some(output),
        }
    }
}
