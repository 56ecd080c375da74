use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tailor_core::{BatchId, RemoteState};

/// Failure of one call to the processing service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// HTTP success, but the envelope said `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the call may succeed if simply repeated later.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) | ApiError::Timeout(_) | ApiError::Decode(_) => true,
            ApiError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ApiError::Rejected(_) | ApiError::InvalidUrl(_) => false,
        }
    }

    /// The most specific human-readable message available.
    pub fn message(&self) -> String {
        match self {
            ApiError::HttpStatus { message, .. } | ApiError::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Transport(err.to_string())
}

/// Pass-through processing options. Only the service interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub use_rag: bool,
    pub compare_versions: bool,
    pub output_format: String,
    pub tailoring_mode: String,
    pub optional_sections: Value,
    pub cover_letter_options: Value,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            use_rag: true,
            compare_versions: false,
            output_format: "docx".to_string(),
            tailoring_mode: "light".to_string(),
            optional_sections: json!({}),
            cover_letter_options: json!({}),
        }
    }
}

/// A batch job as reported by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub id: BatchId,
    pub state: RemoteState,
    pub updated_at: Option<DateTime<Utc>>,
    pub total_jobs: Option<u32>,
    pub completed_jobs: Option<u32>,
    pub failed_jobs: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let status = |status| ApiError::HttpStatus {
            status,
            message: String::new(),
        };
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
        assert!(!ApiError::Rejected("nope".into()).is_transient());
        assert!(ApiError::Transport("reset".into()).is_transient());
    }

    #[test]
    fn message_prefers_service_text() {
        let err = ApiError::HttpStatus {
            status: 422,
            message: "job_urls: field required".into(),
        };
        assert_eq!(err.message(), "job_urls: field required");
        assert_eq!(
            ApiError::Timeout("slow".into()).message(),
            "request timed out: slow"
        );
    }
}
