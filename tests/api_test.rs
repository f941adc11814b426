//! API integration tests.
//!
//! Tests HTTP API endpoints against a [`TestHarness`] server running on a
//! random port. No external tools are registered, so conversions exercise the
//! text and native image paths.

mod common;

use std::time::{Duration, SystemTime};

use common::{convert, pdf_bytes, png_bytes, upload, TestHarness};
use docforge_common::Format;
use docforge_convert::document::text::extract_text;
use serde_json::json;

// ---------------------------------------------------------------------------
// Health, info and docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let (_harness, addr) = TestHarness::with_server().await;
    let url = format!("http://{addr}/health");

    let resp = reqwest::get(&url).await.expect("request failed");
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn formats_lists_extensions_and_pairs() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/formats")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["document"], json!(["pdf", "docx", "doc", "odt", "txt"]));
    assert_eq!(
        json["image"],
        json!(["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"])
    );
    let pairs = json["conversions"].as_array().unwrap();
    assert_eq!(pairs.len(), 16);
    assert!(pairs.contains(&json!({"source": "docx", "target": "pdf", "strategy": "office"})));
}

#[tokio::test]
async fn tools_reports_missing_tools() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/tools")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    let tools = json.as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert!(tools.iter().all(|t| t["available"] == false));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["paths"]["/upload"].is_object());
    assert!(json["paths"]["/convert"].is_object());
    assert!(json["paths"]["/download/{filename}"].is_object());
    assert!(json["components"]["schemas"]["ErrorBody"].is_object());
    assert_eq!(
        json["paths"]["/download/{filename}"]["get"]["responses"]["404"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorBody"
    );
}

#[tokio::test]
async fn request_id_is_echoed() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-42");

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_document_returns_category() {
    let (harness, addr) = TestHarness::with_server().await;

    let resp = upload(addr, "My Notes.txt", b"hello".to_vec()).await;
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "My_Notes.txt");
    assert_eq!(json["file_category"], "document");
    assert_eq!(json["message"], "File uploaded successfully");
    assert_eq!(
        std::fs::read(harness.upload_dir().join("My_Notes.txt")).unwrap(),
        b"hello"
    );
}

#[tokio::test]
async fn upload_image_returns_category() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = upload(addr, "photo.PNG", png_bytes()).await;
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["file_category"], "image");
}

#[tokio::test]
async fn upload_rejects_disallowed_extension() {
    let (harness, addr) = TestHarness::with_server().await;

    let resp = upload(addr, "setup.exe", b"MZ".to_vec()).await;
    assert_eq!(resp.status(), 400);
    assert!(resp.headers().contains_key("x-request-id"));

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "File type not allowed");
    assert_eq!(json["code"], "validation_error");
    assert!(json["request_id"].is_string());
    assert!(!harness.upload_dir().join("setup.exe").exists());
}

#[tokio::test]
async fn upload_without_file_part_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;

    let form = reqwest::multipart::Form::new().text("other", "value");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "No file part");
}

#[tokio::test]
async fn upload_without_filename_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;

    let part = reqwest::multipart::Part::bytes(b"data".to_vec());
    let form = reqwest::multipart::Form::new().part("file", part);
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "No selected file");
}

#[tokio::test]
async fn upload_with_json_body_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/upload"))
        .json(&json!({"file": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let harness = TestHarness::with_config(|c| c.server.max_upload_mb = 1);
    let app = docforge::server::create_router(harness.ctx.clone());
    let stale = harness.seed_upload("stale.txt", b"old");
    std::fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(11 * 60))
        .unwrap();

    let body = vec![b'x'; 1024 * 1024 + 1];
    let request = Request::post("/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
        .header(header::CONTENT_LENGTH, body.len())
        .header("x-request-id", "big-upload")
        .body(Body::from(body))
        .unwrap();

    let resp = app.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), 413);
    assert_eq!(resp.headers()["x-request-id"], "big-upload");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "payload_too_large");
    assert_eq!(json["request_id"], "big-upload");
    assert!(json["error"].as_str().unwrap().contains("1 MB"));

    assert!(!stale.exists());
}

// ---------------------------------------------------------------------------
// Convert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn convert_txt_to_docx_and_download() {
    let (harness, addr) = TestHarness::with_server().await;
    upload(addr, "notes.txt", b"first line\nsecond line".to_vec()).await;

    let resp = convert(addr, json!({"filename": "notes.txt", "target_format": "docx"})).await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "notes.docx");
    assert_eq!(json["download_url"], "/download/notes.docx");
    assert_eq!(json["message"], "File converted successfully");

    let resp = reqwest::get(format!("http://{addr}/download/notes.docx")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment"), "{disposition}");
    assert!(disposition.contains("notes.docx"));

    let bytes = resp.bytes().await.unwrap();
    let downloaded = harness.root.path().join("downloaded.docx");
    std::fs::write(&downloaded, &bytes).unwrap();
    assert_eq!(
        extract_text(&downloaded, Format::Docx).unwrap(),
        "first line\nsecond line"
    );
}

#[tokio::test]
async fn convert_target_is_case_insensitive() {
    let (harness, addr) = TestHarness::with_server().await;
    upload(addr, "notes.txt", b"hello".to_vec()).await;

    let resp = convert(addr, json!({"filename": "notes.txt", "target_format": "ODT"})).await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "notes.odt");

    let path = harness.processed_dir().join("notes.odt");
    assert_eq!(extract_text(&path, Format::Odt).unwrap(), "hello");
}

#[tokio::test]
async fn convert_pdf_to_txt_keeps_page_order() {
    let (_harness, addr) = TestHarness::with_server().await;
    upload(addr, "report.pdf", pdf_bytes(&["Hello world", "Second page"])).await;

    let resp = convert(addr, json!({"filename": "report.pdf", "target_format": "txt"})).await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "report.txt");

    let resp = reqwest::get(format!("http://{addr}/download/report.txt")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    assert_eq!(lines, vec!["Hello world", "Second page"]);
}

#[tokio::test]
async fn convert_png_to_jpg() {
    let (_harness, addr) = TestHarness::with_server().await;
    upload(addr, "logo.png", png_bytes()).await;

    let resp = convert(addr, json!({"filename": "logo.png", "target_format": "jpg"})).await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "logo.jpg");

    let resp = reqwest::get(format!("http://{addr}/download/logo.jpg")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/jpeg");

    let bytes = resp.bytes().await.unwrap();
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
    assert_eq!((img.width(), img.height()), (12, 8));
}

#[tokio::test]
async fn convert_with_compress_copies_unhandled_types() {
    let (harness, addr) = TestHarness::with_server().await;
    upload(addr, "notes.txt", b"compress me".to_vec()).await;

    let resp = convert(
        addr,
        json!({"filename": "notes.txt", "target_format": "odt", "compress": true}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "notes_compressed.odt");

    let resp = reqwest::get(format!("http://{addr}/download/notes_compressed.odt"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let compressed = resp.bytes().await.unwrap();
    let original = std::fs::read(harness.processed_dir().join("notes.odt")).unwrap();
    assert_eq!(compressed.as_ref(), original.as_slice());
}

#[tokio::test]
async fn convert_with_compress_flattens_transparent_png() {
    let (_harness, addr) = TestHarness::with_server().await;
    upload(addr, "icon.bmp", png_bytes()).await;

    let resp = convert(
        addr,
        json!({"filename": "icon.bmp", "target_format": "png", "compress": true}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["filename"], "icon_compressed.jpg");
}

#[tokio::test]
async fn convert_missing_parameters_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;

    for body in [
        json!({}),
        json!({"filename": "notes.txt"}),
        json!({"target_format": "pdf"}),
        json!({"filename": "", "target_format": "pdf"}),
    ] {
        let resp = convert(addr, body.clone()).await;
        assert_eq!(resp.status(), 400, "{body}");
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "Missing parameters");
    }
}

#[tokio::test]
async fn convert_malformed_json_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/convert"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn convert_unknown_upload_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = convert(addr, json!({"filename": "ghost.txt", "target_format": "docx"})).await;
    assert_eq!(resp.status(), 404);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn convert_traversal_name_is_404() {
    let (harness, addr) = TestHarness::with_server().await;
    std::fs::write(harness.root.path().join("uploads/secret.txt"), b"x").unwrap();

    let resp = convert(
        addr,
        json!({"filename": "../secret.txt", "target_format": "docx"}),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn convert_unsupported_pair_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;
    upload(addr, "notes.txt", b"hello".to_vec()).await;

    for target in ["png", "txt", "doc", "mp3"] {
        let resp = convert(addr, json!({"filename": "notes.txt", "target_format": target})).await;
        assert_eq!(resp.status(), 400, "txt -> {target}");
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["code"], "unsupported");
    }
}

#[tokio::test]
async fn convert_to_pdf_without_libreoffice_is_500() {
    let (harness, addr) = TestHarness::with_server().await;
    upload(addr, "notes.txt", b"hello".to_vec()).await;

    let resp = convert(addr, json!({"filename": "notes.txt", "target_format": "pdf"})).await;
    assert_eq!(resp.status(), 500);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        json["error"],
        "Conversion failed: PDF conversion requires LibreOffice installed"
    );
    assert_eq!(json["code"], "conversion_failed");
    assert!(!harness.processed_dir().join("notes.pdf").exists());
}

#[tokio::test]
async fn convert_corrupt_image_is_500() {
    let (_harness, addr) = TestHarness::with_server().await;
    upload(addr, "broken.png", b"not really a png".to_vec()).await;

    let resp = convert(addr, json!({"filename": "broken.png", "target_format": "gif"})).await;
    assert_eq!(resp.status(), 500);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Conversion failed"));
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_missing_file_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/download/nothing.pdf")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn download_does_not_serve_uploads() {
    let (harness, addr) = TestHarness::with_server().await;
    harness.seed_upload("private.txt", b"secret");

    let resp = reqwest::get(format!("http://{addr}/download/..%2Ftemp%2Fprivate.txt"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("http://{addr}/download/private.txt")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn requests_trigger_a_sweep() {
    let (harness, addr) = TestHarness::with_server().await;

    let stale = harness.seed_upload("stale.txt", b"old");
    let fresh = harness.seed_upload("fresh.txt", b"new");
    std::fs::File::options()
        .write(true)
        .open(&stale)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(11 * 60))
        .unwrap();

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    assert!(!stale.exists());
    assert!(fresh.exists());
}
