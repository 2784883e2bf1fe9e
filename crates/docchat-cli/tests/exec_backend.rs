//! Non-interactive commands against a mocked backend.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_ask_uploads_then_prints_answer() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let image = write_file(&docs, "receipt.png", &PNG_SIGNATURE);
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "s-42" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "session_id": "s-42", "question": "Total?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "12.50" })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .args(["--backend-url", &server.uri(), "ask", "--file"])
        .arg(&image)
        .arg("Total?")
        .assert()
        .success()
        .stdout(predicate::str::contains("12.50"))
        .stderr(predicate::str::contains("Processed 1 document(s)"));
}

#[tokio::test]
async fn test_upload_prints_session_id() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let first = write_file(&docs, "a.png", &PNG_SIGNATURE);
    let second = write_file(&docs, "b.png", &PNG_SIGNATURE);
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "s-7" })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .args(["--backend-url", &server.uri(), "upload"])
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("s-7"));
}

#[tokio::test]
async fn test_upload_failure_reports_backend_detail() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let pdf = write_file(&docs, "scan.pdf", b"%PDF-1.4\n%%EOF\n");
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Could not extract any text from the document(s)."
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .args(["--backend-url", &server.uri(), "upload"])
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Could not extract any text from the document(s).",
        ));
}

#[test]
fn test_two_pdfs_are_rejected_before_any_request() {
    let home = TempDir::new().unwrap();
    let docs = TempDir::new().unwrap();
    let first = write_file(&docs, "a.pdf", b"%PDF-1.4\n");
    let second = write_file(&docs, "b.pdf", b"%PDF-1.4\n");

    // Nothing listens here; validation must fail first.
    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .args(["--backend-url", "http://127.0.0.1:9", "upload"])
        .arg(&first)
        .arg(&second)
        .assert()
        .failure()
        .stderr(predicate::str::contains("single PDF"));
}

#[tokio::test]
async fn test_ping_prints_backend_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "DocChat backend running" })),
        )
        .mount(&server)
        .await;

    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .args(["--backend-url", &server.uri(), "ping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DocChat backend running"));
}
