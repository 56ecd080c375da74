use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tailor_core::{OrchestrationError, PollSettings, ResumeFile, ResumeSource};
use tailor_engine::{
    resolve_resume, BatchEvent, BatchOptions, BatchRequest, Orchestrator, ReqwestBatchApi,
    ServiceSettings,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pdf_file() -> ResumeFile {
    ResumeFile {
        file_name: "jane.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4 resume".to_vec(),
    }
}

fn uploader(server: &MockServer, upload_path: &str) -> ReqwestBatchApi {
    let settings = ServiceSettings {
        upload_path: upload_path.to_string(),
        ..ServiceSettings::with_base_url(server.uri())
    };
    ReqwestBatchApi::new(settings).unwrap()
}

#[tokio::test]
async fn pasted_text_needs_no_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let text = resolve_resume(
        &uploader(&server, "/upload-resume"),
        ResumeSource::Text("\n Jane Doe \n".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(text, "Jane Doe");
}

#[tokio::test]
async fn file_is_uploaded_once_to_configured_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "resume_text": " Jane Doe\nRust "})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = resolve_resume(&uploader(&server, "/api/ingest"), ResumeSource::File(pdf_file()))
        .await
        .unwrap();
    assert_eq!(text, "Jane Doe\nRust");
}

#[tokio::test]
async fn rejected_upload_is_reported_with_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-resume"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": "unsupported file type"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = resolve_resume(
        &uploader(&server, "/upload-resume"),
        ResumeSource::File(pdf_file()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        OrchestrationError::UploadFailed("unsupported file type".into())
    );
}

#[tokio::test]
async fn blank_extraction_is_an_upload_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-resume"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "resume_text": "  "})),
        )
        .mount(&server)
        .await;

    let err = resolve_resume(
        &uploader(&server, "/upload-resume"),
        ResumeSource::File(pdf_file()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OrchestrationError::UploadFailed(_)));
}

#[tokio::test]
async fn uploaded_text_is_what_gets_submitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-resume"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "text": "Extracted resume"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/batch/process"))
        .and(body_partial_json(json!({"resume_text": "Extracted resume"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "batch_job_id": 77})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::connect(
        ServiceSettings::with_base_url(server.uri()),
        PollSettings::with_unit(Duration::from_secs(60)),
    )
    .unwrap();
    let handle = orchestrator
        .submit(
            BatchRequest {
                raw_urls: "https://a.example/jobs/1".to_string(),
                resume: Some(ResumeSource::File(pdf_file())),
                options: BatchOptions::default(),
            },
            Arc::new(|_event: BatchEvent| {}),
        )
        .await
        .unwrap();
    assert_eq!(handle.batch_id().as_str(), "77");
    handle.cancel();
}
