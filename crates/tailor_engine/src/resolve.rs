use tailor_core::{OrchestrationError, ResumeSource};
use tailor_logging::{tailor_info, tailor_warn};

use crate::ResumeUploader;

/// Turns a résumé source into canonical text.
///
/// A file costs exactly one upload call; failures are not retried here, the
/// user has to submit again.
pub async fn resolve_resume(
    uploader: &dyn ResumeUploader,
    source: ResumeSource,
) -> Result<String, OrchestrationError> {
    match source {
        ResumeSource::Text(text) => Ok(text.trim().to_string()),
        ResumeSource::File(file) => {
            tailor_info!(
                "Uploading resume file {} ({} bytes)",
                file.file_name,
                file.bytes.len()
            );
            let text = uploader.upload(&file).await.map_err(|err| {
                tailor_warn!("Resume upload failed for {}: {}", file.file_name, err);
                OrchestrationError::UploadFailed(err.message())
            })?;
            let text = text.trim();
            if text.is_empty() {
                return Err(OrchestrationError::UploadFailed(
                    "no text could be read from the uploaded file".to_string(),
                ));
            }
            tailor_info!("Resume file resolved to {} characters", text.chars().count());
            Ok(text.to_string())
        }
    }
}
