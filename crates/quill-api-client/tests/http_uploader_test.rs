use mockito::Matcher;
use quill_api_client::{ApiClient, Auth, HttpUploader};
use quill_core::{ErrorMetadata, IngestConfig, IngestError, RawFile};
use quill_ingest::{UploadValidator, Uploader};
use std::time::Duration;

const UPLOAD_PATH: &str = "/api/upload";

fn uploader(base_url: String, auth: Option<Auth>) -> HttpUploader {
    let client = ApiClient::new(base_url, auth, Duration::from_secs(5)).unwrap();
    HttpUploader::new(client, UPLOAD_PATH, UploadValidator::new(1024, Vec::new()))
}

fn text_file(name: &str) -> RawFile {
    RawFile::new(name, "text/plain", b"hello".to_vec())
}

fn success_body(name: &str) -> String {
    format!(
        r#"{{"success":true,"fileName":"stored-{0}","originalName":"{0}","fileUrl":"/uploads/stored-{0}","fileType":"text/plain"}}"#,
        name
    )
}

#[tokio::test]
async fn test_upload_returns_file_url_and_sends_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .match_header("authorization", "Bearer secret")
        .match_body(Matcher::Regex(r#"name="file"; filename="notes.md""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(success_body("notes.md"))
        .create_async()
        .await;

    let uploader = uploader(server.url(), Some(Auth::Bearer("secret".to_string())));
    let url = uploader.upload_file(&text_file("notes.md")).await.unwrap();

    assert_eq!(url, "/uploads/stored-notes.md");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_key_auth_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .match_header("x-api-key", "k-123")
        .with_status(200)
        .with_body(success_body("a.txt"))
        .create_async()
        .await;

    let uploader = uploader(server.url(), Some(Auth::XApiKey("k-123".to_string())));
    assert!(uploader.upload_file(&text_file("a.txt")).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_body_becomes_remote_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", UPLOAD_PATH)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Failed to upload file"}"#)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let err = uploader.upload_file(&text_file("a.txt")).await.unwrap_err();

    match &err {
        IngestError::Remote { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "Failed to upload file");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_recoverable());
    assert_eq!(err.client_message(), "Failed to upload file");
}

#[tokio::test]
async fn test_malformed_success_body_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let err = uploader.upload_file(&text_file("a.txt")).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_oversized_file_rejected_without_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .expect(0)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let big = RawFile::new("big.bin", "application/octet-stream", vec![0u8; 4096]);
    let err = uploader.upload_file(&big).await.unwrap_err();

    assert!(matches!(err, IngestError::PayloadTooLarge { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_empty_file_is_posted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .match_body(Matcher::Regex(r#"filename="__init__.py""#.to_string()))
        .with_status(200)
        .with_body(success_body("__init__.py"))
        .expect(1)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let empty = RawFile::new("__init__.py", "text/x-python", Vec::<u8>::new());
    let url = uploader.upload_file(&empty).await.unwrap();

    assert_eq!(url, "/uploads/stored-__init__.py");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparseable_content_type_sent_as_octet_stream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", UPLOAD_PATH)
        .match_body(Matcher::Regex(
            "(?i)content-type: application/octet-stream".to_string(),
        ))
        .with_status(200)
        .with_body(success_body("odd.bin"))
        .expect(1)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let odd = RawFile::new("odd.bin", "not a mime type", b"data".to_vec());
    assert!(uploader.upload_file(&odd).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_html_error_page_reported_by_status_reason() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", UPLOAD_PATH)
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html><body><h1>502 Bad Gateway</h1></body></html>")
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let err = uploader.upload_file(&text_file("a.txt")).await.unwrap_err();
    assert_eq!(err.client_message(), "Bad Gateway");
}

#[tokio::test]
async fn test_batch_isolates_per_file_failures() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", UPLOAD_PATH)
        .match_body(Matcher::Regex(r#"filename="good.txt""#.to_string()))
        .with_status(200)
        .with_body(success_body("good.txt"))
        .create_async()
        .await;
    server
        .mock("POST", UPLOAD_PATH)
        .match_body(Matcher::Regex(r#"filename="bad.txt""#.to_string()))
        .with_status(400)
        .with_body(r#"{"error":"No file uploaded"}"#)
        .create_async()
        .await;

    let uploader = uploader(server.url(), None);
    let files = vec![text_file("good.txt"), text_file("bad.txt")];
    let result = uploader.upload_batch(&files).await.unwrap();

    assert_eq!(result.succeeded.len(), 1);
    assert_eq!(result.succeeded[0].index, 0);
    assert_eq!(result.succeeded[0].url, "/uploads/stored-good.txt");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 1);
    assert_eq!(result.failures[0].reason, "No file uploaded");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // nothing listens on port 9 locally
    let uploader = uploader("http://127.0.0.1:9".to_string(), None);
    let err = uploader.upload_file(&text_file("a.txt")).await.unwrap_err();
    assert!(matches!(err, IngestError::Transport(_)));
}

#[test]
fn test_from_config_uses_configured_path() {
    let config = IngestConfig {
        api_url: "http://uploads.test/".to_string(),
        ..IngestConfig::default()
    };
    let uploader = HttpUploader::from_config(&config).unwrap();
    assert_eq!(uploader.client().base_url(), "http://uploads.test");
}
