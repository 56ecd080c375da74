//! JSON shapes exchanged with the processing service.
//!
//! Every response is wrapped in an envelope carrying `success` and, on
//! failure, some mix of `detail`, `error` and `message` fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tailor_core::{BatchId, JobResult, JobStatus, RemoteState, StatusReport};

use crate::{ApiError, JobSummary};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorFields {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

impl ErrorFields {
    /// Validation detail array, then string `detail`, then `error`, then `message`.
    pub(crate) fn most_specific(&self) -> Option<String> {
        if let Some(Value::Array(items)) = &self.detail {
            let joined = items
                .iter()
                .filter_map(validation_item_message)
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        [&self.detail, &self.error, &self.message]
            .into_iter()
            .flatten()
            .find_map(plain_message)
    }
}

fn validation_item_message(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            let msg = map.get("msg").and_then(Value::as_str)?;
            let location = map
                .get("loc")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter(|part| part.as_str() != Some("body"))
                        .map(|part| match part {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .filter(|location| !location.is_empty());
            Some(match location {
                Some(location) => format!("{location}: {msg}"),
                None => msg.to_string(),
            })
        }
        _ => None,
    }
}

fn plain_message(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("msg"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(flatten)]
    errors: ErrorFields,
    #[serde(flatten)]
    body: T,
}

/// Turns an HTTP response into the envelope body, mapping every failure shape
/// onto [`ApiError`].
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(crate::types::map_reqwest_error)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorFields>(&text)
            .ok()
            .and_then(|fields| fields.most_specific())
            .unwrap_or_else(|| status.to_string());
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))?;
    if envelope.success == Some(false) {
        let message = envelope
            .errors
            .most_specific()
            .unwrap_or_else(|| "the service reported an unsuccessful request".to_string());
        return Err(ApiError::Rejected(message));
    }
    Ok(envelope.body)
}

/// Reads an error body from a non-JSON endpoint (the export endpoints).
pub(crate) fn error_from_body(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorFields>(body)
        .ok()
        .and_then(|fields| fields.most_specific())
        .unwrap_or_else(|| status.to_string());
    ApiError::HttpStatus {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProcessRequest<'a> {
    pub resume_text: &'a str,
    pub job_urls: &'a [String],
    pub use_rag: bool,
    pub compare_versions: bool,
    pub output_format: &'a str,
    pub tailoring_mode: &'a str,
    pub optional_sections: &'a Value,
    pub cover_letter_options: &'a Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessBody {
    #[serde(default)]
    pub batch_job_id: Option<Value>,
}

impl ProcessBody {
    pub(crate) fn batch_id(&self) -> Option<BatchId> {
        match self.batch_job_id.as_ref()? {
            Value::String(id) if !id.trim().is_empty() => Some(BatchId::new(id.trim())),
            Value::Number(id) => Some(BatchId::new(id.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    #[serde(default)]
    pub status: Option<StatusPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusPayload {
    pub state: String,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub completed: Option<u32>,
    #[serde(default)]
    pub failed: Option<u32>,
    #[serde(default)]
    pub current_job: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<StatusPayload> for StatusReport {
    fn from(payload: StatusPayload) -> Self {
        StatusReport {
            state: RemoteState::parse(&payload.state),
            total: payload.total,
            completed: payload.completed,
            failed: payload.failed,
            current_job: payload.current_job.as_ref().and_then(current_job_label),
            message: payload.error,
        }
    }
}

/// `current_job` is either a plain label or an object describing the posting.
fn current_job_label(value: &Value) -> Option<String> {
    match value {
        Value::String(label) => Some(label.clone()),
        Value::Object(map) => ["title", "job_title", "url", "job_url"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(ToOwned::to_owned),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsBody {
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultRecord {
    #[serde(default, alias = "url", alias = "job_url")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "title")]
    pub job_title: Option<String>,
    #[serde(default, alias = "tailored_resume")]
    pub tailored_resume_text: Option<String>,
    #[serde(default, alias = "cover_letter")]
    pub cover_letter_text: Option<String>,
    #[serde(default, alias = "error")]
    pub error_message: Option<String>,
}

impl From<ResultRecord> for JobResult {
    fn from(record: ResultRecord) -> Self {
        let status = match record.status.as_deref() {
            Some(status) => JobStatus::parse(status),
            None if record.error_message.is_some() => JobStatus::Failed,
            None if record.tailored_resume_text.is_some() => JobStatus::Success,
            None => JobStatus::Processing,
        };
        JobResult::from_parts(
            record.source_url.unwrap_or_default(),
            status,
            record.job_title,
            record.tailored_resume_text,
            record.cover_letter_text,
            record.error_message,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListJobsBody {
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobRecord {
    pub batch_job_id: String,
    pub state: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub total_jobs: Option<u32>,
    #[serde(default)]
    pub completed_jobs: Option<u32>,
    #[serde(default)]
    pub failed_jobs: Option<u32>,
}

impl From<JobRecord> for JobSummary {
    fn from(record: JobRecord) -> Self {
        JobSummary {
            id: BatchId::new(record.batch_job_id),
            state: RemoteState::parse(&record.state),
            updated_at: record.updated_at.as_deref().and_then(parse_timestamp),
            total_jobs: record.total_jobs,
            completed_jobs: record.completed_jobs,
            failed_jobs: record.failed_jobs,
        }
    }
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    #[serde(default, alias = "text")]
    pub resume_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> ErrorFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn validation_array_wins_over_error_field() {
        let fields = fields(json!({
            "detail": [
                {"loc": ["body", "job_urls"], "msg": "field required", "type": "missing"},
                {"loc": ["body", "resume_text"], "msg": "too short"}
            ],
            "error": "Bad request"
        }));
        assert_eq!(
            fields.most_specific().as_deref(),
            Some("job_urls: field required; resume_text: too short")
        );
    }

    #[test]
    fn string_detail_then_error_then_message() {
        assert_eq!(
            fields(json!({"detail": "Quota exceeded", "error": "x"}))
                .most_specific()
                .as_deref(),
            Some("Quota exceeded")
        );
        assert_eq!(
            fields(json!({"error": "Invalid resume"}))
                .most_specific()
                .as_deref(),
            Some("Invalid resume")
        );
        assert_eq!(
            fields(json!({"message": "Try later"})).most_specific().as_deref(),
            Some("Try later")
        );
        assert_eq!(fields(json!({})).most_specific(), None);
    }

    #[test]
    fn timestamps_with_and_without_zone() {
        let zoned = parse_timestamp("2024-05-01T10:00:00+02:00").unwrap();
        let naive = parse_timestamp("2024-05-01T08:00:00.123456").unwrap();
        assert_eq!(zoned.timestamp(), 1_714_550_400);
        assert_eq!(naive.timestamp(), 1_714_550_400);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn record_without_status_is_inferred() {
        let record: ResultRecord = serde_json::from_value(json!({
            "url": "https://a.example/1",
            "title": "Engineer",
            "tailored_resume": "Jane Doe"
        }))
        .unwrap();
        let result = JobResult::from(record);
        assert!(result.is_success());
        assert_eq!(result.source_url(), "https://a.example/1");
        assert_eq!(result.job_title(), "Engineer");
    }

    #[test]
    fn numeric_batch_id_is_accepted() {
        let body: ProcessBody = serde_json::from_value(json!({"batch_job_id": 42})).unwrap();
        assert_eq!(body.batch_id(), Some(BatchId::new("42")));
    }
}
