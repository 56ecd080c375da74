use chrono::Utc;
use tailor_core::{BatchJob, JobUrlList, OrchestrationError};
use tailor_logging::{tailor_info, tailor_warn};

use crate::{BatchApi, BatchOptions};

/// Issues the single batch-processing request. Polling is left to the caller.
pub async fn submit_batch(
    api: &dyn BatchApi,
    resume_text: &str,
    urls: &JobUrlList,
    options: &BatchOptions,
) -> Result<BatchJob, OrchestrationError> {
    tailor_info!(
        "Submitting batch: urls={} resume_len={} mode={} format={}",
        urls.len(),
        resume_text.len(),
        options.tailoring_mode,
        options.output_format
    );
    let id = api
        .submit(resume_text, urls, options)
        .await
        .map_err(|err| {
            tailor_warn!("Batch submission failed: {}", err);
            OrchestrationError::Submission(err.message())
        })?;
    tailor_info!("Batch submitted: id={}", id);
    Ok(BatchJob::submitted(id, urls.len() as u32, Utc::now()))
}
