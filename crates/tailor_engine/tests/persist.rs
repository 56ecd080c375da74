use std::fs;

use pretty_assertions::assert_eq;
use serde_json::Value;
use tailor_core::{order_by_urls, JobResult, JobStatus};
use tailor_engine::{ensure_output_dir, write_results, AtomicFileWriter, MANIFEST_FILENAME};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("resume.pdf", b"%PDF-1").unwrap();
    assert_eq!(first.file_name().unwrap(), "resume.pdf");
    assert_eq!(fs::read(&first).unwrap(), b"%PDF-1");

    let second = writer.write("resume.pdf", b"%PDF-2").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"%PDF-2");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("resume.txt", b"data").is_err());
    assert!(!file_path.with_file_name("resume.txt").exists());
}

#[test]
fn results_are_written_with_manifest_in_delivery_order() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("batch"));
    let results = vec![
        JobResult::from_parts(
            "https://a.example/1",
            JobStatus::Success,
            Some("Platform Engineer".into()),
            Some("tailored A".into()),
            Some("dear A".into()),
            None,
        ),
        JobResult::failed("https://b.example/2", "posting could not be fetched"),
        JobResult::success("https://c.example/3", "Data Engineer", "tailored C"),
    ];

    let saved = write_results(&writer, &results).unwrap();
    assert_eq!((saved.succeeded, saved.failed), (2, 1));
    assert_eq!(saved.written.len(), 3);
    assert!(saved
        .written
        .iter()
        .all(|path| path.extension().is_some_and(|ext| ext == "txt")));

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(&saved.manifest_path).unwrap()).unwrap();
    assert_eq!(
        saved.manifest_path.file_name().unwrap().to_str(),
        Some(MANIFEST_FILENAME)
    );
    assert_eq!(manifest["result_count"], 3);
    let entries = manifest["results"].as_array().unwrap();
    let urls: Vec<_> = entries
        .iter()
        .map(|entry| entry["source_url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec!["https://a.example/1", "https://b.example/2", "https://c.example/3"]
    );
    assert_eq!(entries[1]["status"], "failed");
    assert_eq!(entries[1]["error_message"], "posting could not be fetched");
    assert!(entries[1]["resume_file"].is_null());

    let resume_file = entries[0]["resume_file"].as_str().unwrap();
    assert!(resume_file.starts_with("Platform_Engineer--"));
    assert_eq!(
        fs::read_to_string(temp.path().join("batch").join(resume_file)).unwrap(),
        "tailored A"
    );
}

#[test]
fn repeated_posting_keeps_both_tailorings() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("batch");
    let writer = AtomicFileWriter::new(dir.clone());
    let url = "https://jobs.example/42";
    let results = order_by_urls(
        vec![
            JobResult::success(url, "Engineer", "first tailoring"),
            JobResult::success(url, "Engineer", "second tailoring"),
        ],
        &[url.to_string(), url.to_string()],
    );

    let saved = write_results(&writer, &results).unwrap();
    assert_eq!(saved.written.len(), 2);
    assert_ne!(saved.written[0], saved.written[1]);
    let contents: Vec<_> = saved
        .written
        .iter()
        .map(|path| fs::read_to_string(path).unwrap())
        .collect();
    assert_eq!(contents, vec!["first tailoring", "second tailoring"]);

    let manifest: Value =
        serde_json::from_str(&fs::read_to_string(&saved.manifest_path).unwrap()).unwrap();
    let files: Vec<_> = manifest["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["resume_file"].as_str().unwrap().to_string())
        .collect();
    assert_ne!(files[0], files[1]);
    assert_eq!(fs::read_to_string(dir.join(&files[1])).unwrap(), "second tailoring");
}
