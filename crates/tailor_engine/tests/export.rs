use pretty_assertions::assert_eq;
use serde_json::json;
use tailor_core::JobResult;
use tailor_engine::{
    export_filename, AtomicFileWriter, ApiError, ExportClient, ExportError, ExportKind,
    ServiceSettings,
};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_export_bytes: u64) -> ExportClient {
    let settings = ServiceSettings {
        max_export_bytes,
        api_token: Some("token-123".to_string()),
        ..ServiceSettings::with_base_url(server.uri())
    };
    ExportClient::new(settings).unwrap()
}

fn tailored() -> JobResult {
    JobResult::success("https://a.example/1", "Platform Engineer", "tailored text")
}

#[tokio::test]
async fn resume_pdf_is_downloaded_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/batch/generate-pdf"))
        .and(header("authorization", "Bearer token-123"))
        .and(body_partial_json(json!({
            "job_title": "Platform Engineer",
            "tailored_resume": "tailored text"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.7 body".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = tailored();
    let bytes = client(&server, 1024).resume_pdf(&result).await.unwrap();
    assert_eq!(bytes.as_ref(), b"%PDF-1.7 body");

    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let name = export_filename(
        result.job_title(),
        result.source_url(),
        ExportKind::ResumePdf.extension(),
    );
    let saved = writer.write(&name, &bytes).unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), b"%PDF-1.7 body");
}

#[tokio::test]
async fn oversized_payload_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/batch/generate-zip"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 4096], "application/zip"))
        .mount(&server)
        .await;

    let err = client(&server, 1024)
        .archive(&[tailored()])
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::TooLarge { max: 1024, .. }));
}

#[tokio::test]
async fn export_error_carries_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/batch/generate-cover-letter-pdf"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "cover letter too long"})),
        )
        .mount(&server)
        .await;

    let result = JobResult::from_parts(
        "https://a.example/1",
        tailor_core::JobStatus::Success,
        Some("Platform Engineer".into()),
        Some("tailored text".into()),
        Some("Dear hiring manager".into()),
        None,
    );
    let err = client(&server, 1024)
        .cover_letter_pdf(&result)
        .await
        .unwrap_err();
    match err {
        ExportError::Api(ApiError::HttpStatus { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "cover letter too long");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_results_are_not_exportable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, 1024);
    let failed = JobResult::failed("https://a.example/1", "timeout");
    assert!(matches!(
        client.resume_pdf(&failed).await,
        Err(ExportError::NotExportable(_))
    ));
    assert!(matches!(
        client.cover_letter_pdf(&tailored()).await,
        Err(ExportError::NotExportable(_))
    ));
    assert!(matches!(
        client.archive(&[failed]).await,
        Err(ExportError::NotExportable(_))
    ));
}
