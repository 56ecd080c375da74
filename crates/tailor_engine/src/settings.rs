use std::time::Duration;

use url::Url;

use crate::ApiError;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Base URL of the processing service, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// Passed through as a bearer token; issuing it is not this crate's concern.
    pub api_token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Path of the résumé ingestion endpoint, relative to `base_url`.
    pub upload_path: String,
    /// Upper bound for downloaded export payloads.
    pub max_export_bytes: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            upload_path: "/upload-resume".to_string(),
            max_export_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ServiceSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins `path` onto the base URL, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(format!("{joined}: {err}")))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))
    }

    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_token.as_deref() {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }
}
