use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tailor_core::PollSettings;
use tailor_engine::{BatchOptions, ServiceSettings};
use tailor_logging::tailor_info;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tailor.ron";

/// Contents of the RON config file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub upload_path: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_export_mib: u64,
    pub poll_unit_ms: u64,
    pub max_error_attempts: u32,
    pub output_dir: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub options: OptionsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub use_rag: bool,
    pub compare_versions: bool,
    pub output_format: String,
    pub tailoring_mode: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        let poll = PollSettings::default();
        Self {
            base_url: service.base_url,
            api_token: None,
            upload_path: service.upload_path,
            connect_timeout_secs: service.connect_timeout.as_secs(),
            request_timeout_secs: service.request_timeout.as_secs(),
            max_export_mib: service.max_export_bytes / (1024 * 1024),
            poll_unit_ms: poll.unit.as_millis() as u64,
            max_error_attempts: poll.max_error_attempts,
            output_dir: PathBuf::from("tailored"),
            log_level: "info".to_string(),
            log_file: Some(PathBuf::from(tailor_logging::DEFAULT_LOG_FILE)),
            options: OptionsConfig::default(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        let options = BatchOptions::default();
        Self {
            use_rag: options.use_rag,
            compare_versions: options.compare_versions,
            output_format: options.output_format,
            tailoring_mode: options.tailoring_mode,
        }
    }
}

impl AppConfig {
    /// Reads `explicit` if given (it must exist), else [`DEFAULT_CONFIG_FILE`]
    /// if present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        tailor_info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            api_token: self.api_token.clone().filter(|token| !token.is_empty()),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            upload_path: self.upload_path.clone(),
            max_export_bytes: self.max_export_mib.saturating_mul(1024 * 1024),
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        let mut settings = PollSettings::with_unit(Duration::from_millis(self.poll_unit_ms.max(1)));
        settings.max_error_attempts = self.max_error_attempts;
        settings
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            use_rag: self.options.use_rag,
            compare_versions: self.options.compare_versions,
            output_format: self.options.output_format.clone(),
            tailoring_mode: self.options.tailoring_mode.clone(),
            ..BatchOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::parse(
            r#"(
                base_url: "https://tailor.example/api",
                poll_unit_ms: 250,
                options: (tailoring_mode: "heavy"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://tailor.example/api");
        assert_eq!(config.upload_path, "/upload-resume");
        assert_eq!(config.options.tailoring_mode, "heavy");
        assert!(config.options.use_rag);

        let poll = config.poll_settings();
        assert_eq!(poll.unit, Duration::from_millis(250));
        assert_eq!(poll.max_error_attempts, 300);
        assert_eq!(config.batch_options().output_format, "docx");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.ron");
        assert!(AppConfig::load(Some(missing.as_path())).is_err());
    }

    #[test]
    fn round_trips_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tailor.ron");
        let mut config = AppConfig::default();
        config.api_token = Some("secret".into());
        config.max_export_mib = 5;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        fs::write(&path, text).unwrap();

        let loaded = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.service_settings().max_export_bytes, 5 * 1024 * 1024);
        assert_eq!(loaded.service_settings().api_token.as_deref(), Some("secret"));
    }
}
