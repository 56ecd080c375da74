use tailor_core::{BatchId, JobResult, JobUrlList, ResumeFile, StatusReport};
use tailor_logging::tailor_warn;

use crate::settings::ServiceSettings;
use crate::types::map_reqwest_error;
use crate::wire::{
    read_envelope, ListJobsBody, ProcessBody, ProcessRequest, ResultsBody, StatusBody, UploadBody,
};
use crate::{ApiError, BatchOptions, JobSummary};

/// The batch endpoints of the processing service.
#[async_trait::async_trait]
pub trait BatchApi: Send + Sync {
    /// `POST /batch/process`
    async fn submit(
        &self,
        resume_text: &str,
        urls: &JobUrlList,
        options: &BatchOptions,
    ) -> Result<BatchId, ApiError>;

    /// `GET /batch/status/{id}`
    async fn status(&self, id: &BatchId) -> Result<StatusReport, ApiError>;

    /// `GET /batch/results/{id}`, records in the order the service sent them.
    async fn results(&self, id: &BatchId) -> Result<Vec<JobResult>, ApiError>;

    /// `GET /batch/list-jobs` for the current user.
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError>;
}

/// The résumé ingestion collaborator: file in, canonical text out.
#[async_trait::async_trait]
pub trait ResumeUploader: Send + Sync {
    async fn upload(&self, file: &ResumeFile) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBatchApi {
    client: reqwest::Client,
    settings: ServiceSettings,
}

impl ReqwestBatchApi {
    pub fn new(settings: ServiceSettings) -> Result<Self, ApiError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.settings.endpoint(path)?;
        let response = self
            .settings
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_envelope(response).await
    }
}

#[async_trait::async_trait]
impl BatchApi for ReqwestBatchApi {
    async fn submit(
        &self,
        resume_text: &str,
        urls: &JobUrlList,
        options: &BatchOptions,
    ) -> Result<BatchId, ApiError> {
        let url = self.settings.endpoint("batch/process")?;
        let request = ProcessRequest {
            resume_text,
            job_urls: urls.as_slice(),
            use_rag: options.use_rag,
            compare_versions: options.compare_versions,
            output_format: &options.output_format,
            tailoring_mode: &options.tailoring_mode,
            optional_sections: &options.optional_sections,
            cover_letter_options: &options.cover_letter_options,
        };
        let response = self
            .settings
            .authorize(self.client.post(url).json(&request))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ProcessBody = read_envelope(response).await?;
        body.batch_id()
            .ok_or_else(|| ApiError::Decode("response carried no batch_job_id".to_string()))
    }

    async fn status(&self, id: &BatchId) -> Result<StatusReport, ApiError> {
        let body: StatusBody = self.get(&format!("batch/status/{id}")).await?;
        body.status
            .map(StatusReport::from)
            .ok_or_else(|| ApiError::Decode("response carried no status".to_string()))
    }

    async fn results(&self, id: &BatchId) -> Result<Vec<JobResult>, ApiError> {
        let body: ResultsBody = self.get(&format!("batch/results/{id}")).await?;
        Ok(body.results.into_iter().map(JobResult::from).collect())
    }

    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        let body: ListJobsBody = self.get("batch/list-jobs").await?;
        Ok(body.jobs.into_iter().map(JobSummary::from).collect())
    }
}

#[async_trait::async_trait]
impl ResumeUploader for ReqwestBatchApi {
    async fn upload(&self, file: &ResumeFile) -> Result<String, ApiError> {
        let url = self.settings.endpoint(&self.settings.upload_path)?;
        let form = reqwest::multipart::Form::new().part("file", file_part(file));
        let response = self
            .settings
            .authorize(self.client.post(url).multipart(form))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: UploadBody = read_envelope(response).await?;
        Ok(body.resume_text.unwrap_or_default())
    }
}

fn file_part(file: &ResumeFile) -> reqwest::multipart::Part {
    let part = || {
        reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
    };
    match file.content_type.as_deref() {
        Some(content_type) => part().mime_str(content_type).unwrap_or_else(|err| {
            tailor_warn!(
                "Ignoring content type {:?} for {}: {}",
                content_type,
                file.file_name,
                err
            );
            part()
        }),
        None => part(),
    }
}
