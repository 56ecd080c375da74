use crate::ValidationError;

/// Everything the orchestration layer reports to the presentation layer.
///
/// Errors are values handed to the event sink; none of them aborts the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("resume upload failed: {0}")]
    UploadFailed(String),
    #[error("batch submission failed: {0}")]
    Submission(String),
    #[error("batch processing failed: {0}")]
    BatchFailed(String),
    #[error("lost contact with the processing service after {attempts} attempts")]
    PollingTimedOut { attempts: u32 },
    #[error("your batch is taking longer than expected; please check back later ({0})")]
    RecoveryFailed(String),
    #[error("batch finished but its results could not be loaded: {0}")]
    ResultLoad(String),
    #[error("a batch is already in progress")]
    BatchInFlight,
}

impl OrchestrationError {
    /// Whether the user has to change their input before trying again.
    pub fn needs_new_input(&self) -> bool {
        matches!(
            self,
            OrchestrationError::Validation(_)
                | OrchestrationError::UploadFailed(_)
                | OrchestrationError::Submission(_)
        )
    }
}
