use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tailor_core::{
    validate_request, BatchId, BatchOutcome, OrchestrationError, PollSettings, PollerState,
    ResumeSource,
};
use tailor_logging::{tailor_error, tailor_info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::poller::PollLoop;
use crate::resolve::resolve_resume;
use crate::submit::submit_batch;
use crate::{
    ApiError, BatchApi, BatchOptions, BatchSink, ReqwestBatchApi, ResumeUploader, ServiceSettings,
    UsageLedger,
};

/// Raw user input for one batch.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub raw_urls: String,
    pub resume: Option<ResumeSource>,
    pub options: BatchOptions,
}

/// One orchestration unit per logical session.
///
/// At most one batch runs at a time; [`Orchestrator::submit`] rejects a new
/// one with [`OrchestrationError::BatchInFlight`] until the previous batch
/// has settled or been cancelled.
pub struct Orchestrator {
    api: Arc<dyn BatchApi>,
    uploader: Arc<dyn ResumeUploader>,
    ledger: Arc<UsageLedger>,
    settings: PollSettings,
    active: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn BatchApi>,
        uploader: Arc<dyn ResumeUploader>,
        ledger: Arc<UsageLedger>,
        settings: PollSettings,
    ) -> Self {
        Self {
            api,
            uploader,
            ledger,
            settings,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Orchestrator talking HTTP to the service described by `service`.
    pub fn connect(service: ServiceSettings, settings: PollSettings) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestBatchApi::new(service)?);
        Ok(Self::new(
            api.clone(),
            api,
            Arc::new(UsageLedger::default()),
            settings,
        ))
    }

    pub fn api(&self) -> Arc<dyn BatchApi> {
        self.api.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Validates, resolves the résumé, submits, then polls in a background task.
    ///
    /// Errors before the batch exists are returned here; everything after is
    /// reported through `sink` and the handle's outcome. Must be called from
    /// within a tokio runtime.
    pub async fn submit(
        &self,
        request: BatchRequest,
        sink: Arc<dyn BatchSink>,
    ) -> Result<BatchHandle, OrchestrationError> {
        let guard = ActiveGuard::claim(&self.active).ok_or(OrchestrationError::BatchInFlight)?;

        let validated = validate_request(&request.raw_urls, request.resume)?;
        let resume_text = resolve_resume(self.uploader.as_ref(), validated.resume).await?;
        let job = submit_batch(
            self.api.as_ref(),
            &resume_text,
            &validated.urls,
            &request.options,
        )
        .await?;

        let batch_id = job.id().clone();
        let cancel = CancellationToken::new();
        let poll_loop = PollLoop::new(
            self.api.clone(),
            sink,
            self.ledger.clone(),
            cancel.clone(),
        );
        let state = PollerState::new(job, validated.urls, self.settings.clone());

        let task = tokio::spawn(async move {
            let _guard = guard;
            poll_loop.run(state).await
        });
        tailor_info!("Polling started for batch {}", batch_id);

        Ok(BatchHandle {
            batch_id,
            cancel,
            task: Some(task),
        })
    }
}

struct ActiveGuard {
    active: Arc<AtomicBool>,
}

impl ActiveGuard {
    fn claim(active: &Arc<AtomicBool>) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self {
            active: active.clone(),
        })
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Owned handle to a running batch. Dropping it cancels the batch.
pub struct BatchHandle {
    batch_id: BatchId,
    cancel: CancellationToken,
    task: Option<JoinHandle<BatchOutcome>>,
}

impl BatchHandle {
    /// Id returned by the submission; recovery may later adopt another one.
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// Stops the next tick from firing and discards any in-flight answer.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this batch, for signal handlers that outlive a `join`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    pub async fn join(mut self) -> BatchOutcome {
        let Some(task) = self.task.take() else {
            return BatchOutcome::Cancelled;
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tailor_error!("Batch {} task failed: {}", self.batch_id, err);
                BatchOutcome::Cancelled
            }
        }
    }
}

impl Drop for BatchHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}
