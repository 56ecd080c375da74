use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tailor_core::BatchId;
use tailor_logging::{tailor_info, tailor_warn};

use crate::ApiError;

/// Records usage for a finished batch (quota, billing, analytics).
#[async_trait::async_trait]
pub trait UsageRecorder: Send + Sync {
    async fn record_batch(&self, id: &BatchId) -> Result<(), ApiError>;
}

/// Recorder for hosts without a usage backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUsageRecorder;

#[async_trait::async_trait]
impl UsageRecorder for LogUsageRecorder {
    async fn record_batch(&self, id: &BatchId) -> Result<(), ApiError> {
        tailor_info!("Usage recorded for batch {}", id);
        Ok(())
    }
}

/// Idempotent "mark batch accounted" step, keyed by batch id.
///
/// The id is claimed before the recorder runs, so a failed recording is
/// logged and never repeated.
pub struct UsageLedger {
    recorder: Arc<dyn UsageRecorder>,
    accounted: Mutex<HashSet<BatchId>>,
}

impl UsageLedger {
    pub fn new(recorder: Arc<dyn UsageRecorder>) -> Self {
        Self {
            recorder,
            accounted: Mutex::new(HashSet::new()),
        }
    }

    /// Returns `true` if this call was the one that accounted the batch.
    pub async fn mark_accounted(&self, id: &BatchId) -> bool {
        let claimed = self
            .accounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        if !claimed {
            return false;
        }
        if let Err(err) = self.recorder.record_batch(id).await {
            tailor_warn!("Recording usage for batch {} failed: {}", id, err);
        }
        true
    }

    pub fn is_accounted(&self, id: &BatchId) -> bool {
        self.accounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new(Arc::new(LogUsageRecorder))
    }
}
