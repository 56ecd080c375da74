use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use tailor_core::{JobResult, JobStatus};
use tailor_logging::tailor_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::UniqueNames;

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Files written for one delivered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResults {
    pub written: Vec<PathBuf>,
    pub manifest_path: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
}

/// Writes each tailored résumé (and cover letter, when present) as a text
/// file, plus a `manifest.json` listing every record in delivery order.
pub fn write_results(
    writer: &AtomicFileWriter,
    results: &[JobResult],
) -> Result<SavedResults, PersistError> {
    let mut written = Vec::new();
    let mut entries = Vec::with_capacity(results.len());
    let mut names = UniqueNames::new();

    for result in results {
        let resume_file = match result.tailored_resume_text() {
            Some(text) if result.is_success() => {
                let name = names.claim(result.job_title(), result.source_url(), "txt");
                written.push(writer.write(&name, text.as_bytes())?);
                Some(name)
            }
            _ => None,
        };
        let cover_letter_file = match result.cover_letter_text() {
            Some(text) if result.is_success() => {
                let title = format!("{} cover letter", result.job_title());
                let name = names.claim(&title, result.source_url(), "txt");
                written.push(writer.write(&name, text.as_bytes())?);
                Some(name)
            }
            _ => None,
        };
        entries.push(json!({
            "source_url": result.source_url(),
            "status": result.status().to_string(),
            "job_title": result.job_title(),
            "resume_file": resume_file,
            "cover_letter_file": cover_letter_file,
            "error_message": result.error_message(),
        }));
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let failed = results
        .iter()
        .filter(|r| r.status() == JobStatus::Failed)
        .count();
    let manifest = json!({
        "result_count": results.len(),
        "succeeded": succeeded,
        "failed": failed,
        "results": entries,
    });
    let body = serde_json::to_vec_pretty(&manifest).map_err(io::Error::other)?;
    let manifest_path = writer.write(MANIFEST_FILENAME, &body)?;

    tailor_info!(
        "Saved {} result files to {}",
        written.len(),
        writer.dir().display()
    );
    Ok(SavedResults {
        written,
        manifest_path,
        succeeded,
        failed,
    })
}
