use url::Url;

/// Upper bound on job postings accepted in one batch.
pub const MAX_JOB_URLS: usize = 10;

/// Offending lines quoted back in an [`ValidationError::InvalidUrls`] message.
const MAX_REPORTED_INVALID: usize = 3;

/// A résumé file picked by the user, before the ingestion service turned it into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    /// Text pasted directly by the user.
    Text(String),
    /// An uploaded file whose text is obtained from the ingestion service.
    File(ResumeFile),
}

impl ResumeSource {
    pub fn is_empty(&self) -> bool {
        match self {
            ResumeSource::Text(text) => text.trim().is_empty(),
            ResumeSource::File(file) => file.bytes.is_empty(),
        }
    }
}

/// Ordered list of 1..=[`MAX_JOB_URLS`] absolute URLs. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUrlList(Vec<String>);

impl JobUrlList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a JobUrlList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please provide a resume, either as a file or as pasted text")]
    EmptyResume,
    #[error("please enter at least one job URL")]
    EmptyUrlList,
    #[error("too many job URLs: {count} given, at most {max} allowed")]
    TooManyUrls { count: usize, max: usize },
    #[error("invalid job URL(s): {0}")]
    InvalidUrls(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub resume: ResumeSource,
    pub urls: JobUrlList,
}

/// Checks the résumé first, then the URL list.
pub fn validate_request(
    raw_urls: &str,
    resume: Option<ResumeSource>,
) -> Result<ValidatedRequest, ValidationError> {
    let resume = match resume {
        Some(source) if !source.is_empty() => source,
        _ => return Err(ValidationError::EmptyResume),
    };
    let urls = parse_job_urls(raw_urls)?;
    Ok(ValidatedRequest { resume, urls })
}

pub fn parse_job_urls(raw: &str) -> Result<JobUrlList, ValidationError> {
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if lines.is_empty() {
        return Err(ValidationError::EmptyUrlList);
    }
    if lines.len() > MAX_JOB_URLS {
        return Err(ValidationError::TooManyUrls {
            count: lines.len(),
            max: MAX_JOB_URLS,
        });
    }

    let invalid: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| !is_absolute_url(line))
        .collect();
    if !invalid.is_empty() {
        let mut message = invalid
            .iter()
            .take(MAX_REPORTED_INVALID)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        if invalid.len() > MAX_REPORTED_INVALID {
            message.push_str("...");
        }
        return Err(ValidationError::InvalidUrls(message));
    }

    Ok(JobUrlList(lines))
}

fn is_absolute_url(line: &str) -> bool {
    Url::parse(line).map(|url| url.has_host()).unwrap_or(false)
}
