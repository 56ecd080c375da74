use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use serde::Serialize;
use tailor_core::JobResult;
use tailor_logging::{tailor_debug, tailor_info};

use crate::settings::ServiceSettings;
use crate::types::map_reqwest_error;
use crate::wire::error_from_body;
use crate::ApiError;

/// Documents the export collaborators can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    ResumePdf,
    CoverLetterPdf,
    Zip,
}

impl ExportKind {
    fn path(self) -> &'static str {
        match self {
            ExportKind::ResumePdf => "batch/generate-pdf",
            ExportKind::CoverLetterPdf => "batch/generate-cover-letter-pdf",
            ExportKind::Zip => "batch/generate-zip",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::ResumePdf | ExportKind::CoverLetterPdf => "pdf",
            ExportKind::Zip => "zip",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: {0}")]
    NotExportable(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("export payload too large: {actual} bytes (max {max})")]
    TooLarge { max: u64, actual: u64 },
}

#[derive(Debug, Serialize)]
struct DocumentRequest<'a> {
    job_title: &'a str,
    source_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tailored_resume: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_letter: Option<&'a str>,
}

impl<'a> DocumentRequest<'a> {
    fn from_result(result: &'a JobResult) -> Self {
        Self {
            job_title: result.job_title(),
            source_url: result.source_url(),
            tailored_resume: result.tailored_resume_text(),
            cover_letter: result.cover_letter_text(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArchiveRequest<'a> {
    results: Vec<DocumentRequest<'a>>,
}

/// Client for the post-hoc export endpoints. Payloads are opaque bytes.
#[derive(Debug, Clone)]
pub struct ExportClient {
    client: reqwest::Client,
    settings: ServiceSettings,
}

impl ExportClient {
    pub fn new(settings: ServiceSettings) -> Result<Self, ApiError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }

    pub async fn resume_pdf(&self, result: &JobResult) -> Result<Bytes, ExportError> {
        if !result.is_success() {
            return Err(ExportError::NotExportable("job did not succeed"));
        }
        self.download(ExportKind::ResumePdf, &DocumentRequest::from_result(result))
            .await
    }

    pub async fn cover_letter_pdf(&self, result: &JobResult) -> Result<Bytes, ExportError> {
        if !result.is_success() || result.cover_letter_text().is_none() {
            return Err(ExportError::NotExportable("job has no cover letter"));
        }
        self.download(
            ExportKind::CoverLetterPdf,
            &DocumentRequest::from_result(result),
        )
        .await
    }

    /// One archive holding every successful result.
    pub async fn archive(&self, results: &[JobResult]) -> Result<Bytes, ExportError> {
        let request = ArchiveRequest {
            results: results
                .iter()
                .filter(|result| result.is_success())
                .map(DocumentRequest::from_result)
                .collect(),
        };
        if request.results.is_empty() {
            return Err(ExportError::NotExportable("no successful results"));
        }
        self.download(ExportKind::Zip, &request).await
    }

    async fn download<B: Serialize + ?Sized>(
        &self,
        kind: ExportKind,
        body: &B,
    ) -> Result<Bytes, ExportError> {
        let max = self.settings.max_export_bytes;
        let url = self.settings.endpoint(kind.path())?;
        let response = self
            .settings
            .authorize(self.client.post(url).json(body))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &text).into());
        }
        if let Some(len) = response.content_length() {
            if len > max {
                return Err(ExportError::TooLarge { max, actual: len });
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = (buffer.len() + chunk.len()) as u64;
            if next_len > max {
                return Err(ExportError::TooLarge {
                    max,
                    actual: next_len,
                });
            }
            buffer.extend_from_slice(&chunk);
            tailor_debug!("{:?} export: {} bytes so far", kind, buffer.len());
        }
        tailor_info!("{:?} export downloaded ({} bytes)", kind, buffer.len());
        Ok(buffer.freeze())
    }
}
