mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cfe_bill_sync::clipboard::MemoryClipboard;
use cfe_bill_sync::pipeline::{self, SyncConfig};
use cfe_bill_sync::{SyncError, TransportError};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENTS_PATH: &str = "/repos/owner/bills/contents/csv-folder/recibo.csv";

fn bill_on_disk() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let pdf = dir.path().join("recibo.pdf");
    common::create_test_pdf(&pdf, &[common::SAMPLE_BILL.to_vec()])
        .expect("PDF fixture should be created");
    let input = pdf.to_string_lossy().into_owned();
    (dir, input)
}

fn config_for(server: &MockServer, input: String, work_dir: &TempDir) -> SyncConfig {
    let mut config = SyncConfig::new(input, "owner/bills", "main", "secret-token");
    config.customer_name = "Casa".to_string();
    config.api_base_url = server.uri();
    config.work_dir = work_dir.path().to_path_buf();
    config
}

async fn put_body(server: &MockServer) -> Value {
    let requests = server
        .received_requests()
        .await
        .expect("request recording should be enabled");
    let put = requests
        .iter()
        .find(|request| request.method.as_str() == "PUT")
        .expect("a PUT request should have been sent");
    serde_json::from_slice(&put.body).expect("PUT body should be JSON")
}

#[tokio::test]
async fn updates_existing_file_with_its_content_hash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sha": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .and(body_partial_json(json!({
            "sha": "abc123",
            "branch": "main",
            "message": "Updating converted CSV file",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, input) = bill_on_disk();
    let clipboard = MemoryClipboard::default();
    let outcome = pipeline::run(&config_for(&server, input, &dir), &clipboard)
        .await
        .expect("sync should succeed");

    assert_eq!(outcome.upload.status, 200);
    assert_eq!(
        outcome.upload.target.existing_content_hash.as_deref(),
        Some("abc123")
    );
    assert_eq!(outcome.upload.target.remote_path, "csv-folder/recibo.csv");
    assert_eq!(outcome.csv_path, dir.path().join("recibo.csv"));
}

#[tokio::test]
async fn creates_new_file_without_content_hash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, input) = bill_on_disk();
    let clipboard = MemoryClipboard::default();
    let outcome = pipeline::run(&config_for(&server, input, &dir), &clipboard)
        .await
        .expect("sync should succeed");

    assert_eq!(outcome.upload.status, 201);
    assert!(outcome.upload.target.existing_content_hash.is_none());

    let body = put_body(&server).await;
    assert!(body.get("sha").is_none(), "body: {body}");
    assert_eq!(body["message"], "Adding converted CSV file");
    assert_eq!(body["branch"], "main");

    let local_csv = std::fs::read(&outcome.csv_path).expect("local CSV should exist");
    let uploaded = STANDARD
        .decode(body["content"].as_str().expect("content should be a string"))
        .expect("content should be base64");
    assert_eq!(uploaded, local_csv);
}

#[tokio::test]
async fn copies_summary_line_to_clipboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let (dir, input) = bill_on_disk();
    let clipboard = MemoryClipboard::default();
    let outcome = pipeline::run(&config_for(&server, input, &dir), &clipboard)
        .await
        .expect("sync should succeed");

    let expected = "Casa - Average consumption from the last 3 = 840.00";
    assert_eq!(outcome.summary_line.as_deref(), Some(expected));
    assert_eq!(clipboard.contents(), vec![expected.to_string()]);
}

#[tokio::test]
async fn downloads_remote_pdf_into_work_dir() {
    let server = MockServer::start().await;
    let pdf = common::test_pdf_bytes(&[common::SAMPLE_BILL.to_vec()])
        .expect("PDF fixture should be created");
    Mock::given(method("GET"))
        .and(path("/files/recibo.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().expect("tempdir should be created");
    let input = format!("{}/files/recibo.pdf", server.uri());
    let clipboard = MemoryClipboard::default();
    let outcome = pipeline::run(&config_for(&server, input, &work_dir), &clipboard)
        .await
        .expect("sync should succeed");

    assert_eq!(outcome.pdf_path, work_dir.path().join("recibo.pdf"));
    assert_eq!(
        std::fs::read(&outcome.pdf_path).expect("downloaded PDF should exist"),
        pdf
    );
    assert!(outcome.csv_path.exists());
    assert_eq!(outcome.upload.target.remote_path, "csv-folder/recibo.csv");
}

#[tokio::test]
async fn failed_download_stops_before_upload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let work_dir = tempfile::tempdir().expect("tempdir should be created");
    let input = format!("{}/files/missing.pdf", server.uri());
    let clipboard = MemoryClipboard::default();
    let error = pipeline::run(&config_for(&server, input, &work_dir), &clipboard)
        .await
        .expect_err("download should fail");

    match error {
        SyncError::Transport(TransportError::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(clipboard.contents().is_empty());
    assert!(!work_dir.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn rejected_upload_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_string("sha mismatch"))
        .mount(&server)
        .await;

    let (dir, input) = bill_on_disk();
    let clipboard = MemoryClipboard::default();
    let error = pipeline::run(&config_for(&server, input, &dir), &clipboard)
        .await
        .expect_err("upload should fail");

    match error {
        SyncError::Transport(TransportError::Http {
            method,
            status,
            body,
            ..
        }) => {
            assert_eq!(method, "PUT");
            assert_eq!(status, 409);
            assert_eq!(body, "sha mismatch");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(dir.path().join("recibo.csv").exists());
}

#[tokio::test]
async fn unexpected_lookup_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let (dir, input) = bill_on_disk();
    let clipboard = MemoryClipboard::default();
    let error = pipeline::run(&config_for(&server, input, &dir), &clipboard)
        .await
        .expect_err("lookup should fail");

    assert!(
        matches!(
            error,
            SyncError::Transport(TransportError::Http { status: 401, .. })
        ),
        "unexpected error: {error:?}"
    );
}
