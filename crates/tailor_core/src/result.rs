use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Success,
    Failed,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" | "completed" | "complete" | "done" => JobStatus::Success,
            "failed" | "error" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of tailoring the résumé against one job posting.
///
/// Built only through [`JobResult::from_parts`] (or the shorthands), which
/// guarantees a success carries résumé text and a failure carries a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    source_url: String,
    status: JobStatus,
    job_title: String,
    tailored_resume_text: Option<String>,
    cover_letter_text: Option<String>,
    error_message: Option<String>,
}

impl JobResult {
    const UNKNOWN_TITLE: &'static str = "Untitled position";
    const UNKNOWN_ERROR: &'static str = "Unknown error";
    const EMPTY_RESUME_ERROR: &'static str = "Service returned an empty tailored resume";

    pub fn from_parts(
        source_url: impl Into<String>,
        status: JobStatus,
        job_title: Option<String>,
        tailored_resume_text: Option<String>,
        cover_letter_text: Option<String>,
        error_message: Option<String>,
    ) -> Self {
        let non_empty = |value: Option<String>| value.filter(|text| !text.trim().is_empty());
        let tailored_resume_text = non_empty(tailored_resume_text);
        let cover_letter_text = non_empty(cover_letter_text);
        let mut error_message = non_empty(error_message);

        let status = match status {
            JobStatus::Success if tailored_resume_text.is_none() => {
                error_message.get_or_insert_with(|| Self::EMPTY_RESUME_ERROR.to_string());
                JobStatus::Failed
            }
            JobStatus::Failed => {
                error_message.get_or_insert_with(|| Self::UNKNOWN_ERROR.to_string());
                JobStatus::Failed
            }
            other => other,
        };

        Self {
            source_url: source_url.into(),
            status,
            job_title: non_empty(job_title).unwrap_or_else(|| Self::UNKNOWN_TITLE.to_string()),
            tailored_resume_text,
            cover_letter_text,
            error_message,
        }
    }

    pub fn success(
        source_url: impl Into<String>,
        job_title: impl Into<String>,
        tailored_resume_text: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            source_url,
            JobStatus::Success,
            Some(job_title.into()),
            Some(tailored_resume_text.into()),
            None,
            None,
        )
    }

    pub fn failed(source_url: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::from_parts(
            source_url,
            JobStatus::Failed,
            None,
            None,
            None,
            Some(error_message.into()),
        )
    }

    /// Fills in the source URL when the service did not echo one back.
    pub fn with_source_url_if_missing(mut self, url: &str) -> Self {
        if self.source_url.trim().is_empty() {
            self.source_url = url.to_string();
        }
        self
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn tailored_resume_text(&self) -> Option<&str> {
        self.tailored_resume_text.as_deref()
    }

    pub fn cover_letter_text(&self) -> Option<&str> {
        self.cover_letter_text.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }
}

/// Reorders results to follow the submitted URL order.
///
/// Each URL claims the first unclaimed result with the same source URL, so
/// duplicated URLs map to distinct results. Results matching no URL are kept
/// after the matched ones, in the order the service sent them.
pub fn order_by_urls(results: Vec<JobResult>, urls: &[String]) -> Vec<JobResult> {
    let mut pending: Vec<Option<JobResult>> = results.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(pending.len());

    for url in urls {
        let slot = pending
            .iter_mut()
            .find(|slot| matches!(slot, Some(result) if same_url(result.source_url(), url)));
        if let Some(result) = slot.and_then(|slot| slot.take()) {
            ordered.push(result);
        }
    }
    ordered.extend(pending.into_iter().flatten());
    ordered
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}
