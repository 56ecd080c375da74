use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use tailor_core::{BatchOutcome, BatchView, JobResult, OrchestrationError, ResumeFile, ResumeSource};
use tailor_engine::{
    write_results, AtomicFileWriter, BatchRequest, CallbackSink, ExportClient, ExportKind,
    Orchestrator, UniqueNames,
};
use tailor_logging::{tailor_info, tailor_warn};

use crate::cli::RunArgs;
use crate::config::AppConfig;

pub async fn run_batch(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let request = BatchRequest {
        raw_urls: collect_urls(args)?,
        resume: Some(read_resume(&args.resume)?),
        options: config.batch_options(),
    };
    let orchestrator = Orchestrator::connect(config.service_settings(), config.poll_settings())?;

    let sink = Arc::new(CallbackSink {
        on_progress: |view: BatchView| println!("{}", progress_line(&view)),
        on_complete: |results: Vec<JobResult>| {
            println!("Batch finished with {} results", results.len())
        },
        // Reported once, by `main`, through the returned error.
        on_error: |_: OrchestrationError| {},
    });
    let handle = orchestrator.submit(request, sink).await?;
    println!("Submitted batch {}", handle.batch_id());

    let token = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tailor_warn!("Interrupted; cancelling batch");
            token.cancel();
        }
    });
    let outcome = handle.join().await;
    interrupt.abort();

    match outcome {
        BatchOutcome::Completed(results) => {
            let dir = output_dir(config);
            save(config, &dir, &results, args).await?;
            println!("Results written to {}", dir.display());
            Ok(())
        }
        BatchOutcome::Failed(error) => Err(batch_failure(error)),
        BatchOutcome::Cancelled => {
            println!("Batch cancelled");
            Ok(())
        }
    }
}

pub async fn list_jobs(config: &AppConfig) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::connect(config.service_settings(), config.poll_settings())?;
    let jobs = orchestrator.api().list_jobs().await?;
    if jobs.is_empty() {
        println!("No batch jobs");
    }
    for job in jobs {
        let updated = job
            .updated_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let count = |value: Option<u32>| value.map_or("-".to_string(), |n| n.to_string());
        println!(
            "{:<36} {:<12} {:<19} {}/{} done, {} failed",
            job.id.as_str(),
            job.state.to_string(),
            updated,
            count(job.completed_jobs),
            count(job.total_jobs),
            count(job.failed_jobs)
        );
    }
    Ok(())
}

fn batch_failure(error: OrchestrationError) -> anyhow::Error {
    anyhow::Error::new(error).context("Batch failed")
}

fn progress_line(view: &BatchView) -> String {
    let mut line = format!(
        "[{:>3}%] {} {}/{} done, {} failed",
        view.percent, view.state, view.completed, view.total, view.failed
    );
    if let Some(label) = &view.current_job_label {
        line.push_str(" - ");
        line.push_str(label);
    }
    line
}

fn collect_urls(args: &RunArgs) -> anyhow::Result<String> {
    let mut lines = args.urls.clone();
    if let Some(path) = &args.urls_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading url list {}", path.display()))?;
        lines.extend(text.lines().map(str::to_string));
    }
    Ok(lines.join("\n"))
}

fn read_resume(path: &Path) -> anyhow::Result<ResumeSource> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if matches!(extension.as_str(), "txt" | "md" | "text") {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading resume {}", path.display()))?;
        return Ok(ResumeSource::Text(text));
    }

    let content_type = match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "doc" => Some("application/msword"),
        _ => None,
    };
    let bytes = fs::read(path).with_context(|| format!("reading resume {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume".to_string());
    Ok(ResumeSource::File(ResumeFile {
        file_name,
        content_type: content_type.map(str::to_string),
        bytes,
    }))
}

fn output_dir(config: &AppConfig) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    config.output_dir.join(format!("batch-{stamp}"))
}

async fn save(
    config: &AppConfig,
    dir: &Path,
    results: &[JobResult],
    args: &RunArgs,
) -> anyhow::Result<()> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let saved = write_results(&writer, results)?;
    println!("{} succeeded, {} failed", saved.succeeded, saved.failed);
    for result in results.iter().filter(|result| !result.is_success()) {
        println!(
            "  {}: {}",
            result.source_url(),
            result.error_message().unwrap_or_default()
        );
    }
    if saved.succeeded == 0 {
        bail!("no posting was tailored successfully");
    }
    if !(args.export_pdf || args.export_zip) {
        return Ok(());
    }

    let exports = ExportClient::new(config.service_settings())?;
    if args.export_pdf {
        let mut names = UniqueNames::new();
        let extension = ExportKind::ResumePdf.extension();
        for result in results.iter().filter(|result| result.is_success()) {
            let resume_name = names.claim(result.job_title(), result.source_url(), extension);
            match exports.resume_pdf(result).await {
                Ok(bytes) => {
                    writer.write(&resume_name, &bytes)?;
                }
                Err(err) => tailor_warn!("Resume PDF for {} failed: {}", result.source_url(), err),
            }
            if result.cover_letter_text().is_some() {
                let title = format!("{} cover letter", result.job_title());
                let letter_name = names.claim(&title, result.source_url(), extension);
                match exports.cover_letter_pdf(result).await {
                    Ok(bytes) => {
                        writer.write(&letter_name, &bytes)?;
                    }
                    Err(err) => tailor_warn!(
                        "Cover letter PDF for {} failed: {}",
                        result.source_url(),
                        err
                    ),
                }
            }
        }
    }
    if args.export_zip {
        match exports.archive(results).await {
            Ok(bytes) => {
                let path = writer.write("tailored-resumes.zip", &bytes)?;
                tailor_info!("Archive written to {}", path.display());
            }
            Err(err) => tailor_warn!("ZIP export failed: {}", err),
        }
    }
    Ok(())
}
