//! Upload endpoint integration tests.
//!
//! Run with: `cargo test -p lumen-api --test upload_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, fixtures, setup_test_app, setup_test_app_with};
use serde_json::Value;

const MIB: usize = 1024 * 1024;

fn image_form(file_name: &str, mime_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(data).file_name(file_name).mime_type(mime_type);
    MultipartForm::new().add_part("image", part)
}

#[tokio::test]
async fn test_upload_png_is_stored() {
    let app = setup_test_app().await;
    let client = app.client();
    let png = fixtures::create_minimal_png();

    let response = client
        .post(&api_path("/upload"))
        .multipart(image_form("pixel.png", "image/png", png.clone()))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let key = body["key"].as_str().expect("Expected 'key' in upload response");
    assert!(key.starts_with("images/") && key.ends_with(".png"));
    assert_eq!(body["size"], png.len());
    assert_eq!(body["mimetype"], "image/png");
    assert_eq!(body["originalname"], "pixel.png");
    assert_eq!(
        body["url"],
        format!("http://localhost:5000/uploads/{}", key)
    );

    let stored = std::fs::read(app.temp_dir.path().join(key)).expect("stored file");
    assert_eq!(stored, png);

    let served = client.get(&format!("/uploads/{}", key)).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_upload_with_extra_text_fields() {
    let app = setup_test_app().await;
    let form = image_form("pixel.png", "image/png", fixtures::create_minimal_png())
        .add_text("caption", "Tower on the hill");

    let response = app.client().post(&api_path("/upload")).multipart(form).await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_upload_non_image_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(image_form("notes.txt", "text/plain", b"hello".to_vec()))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body, serde_json::json!({ "message": "Only image files are allowed" }));
    assert_eq!(std::fs::read_dir(app.temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_at_limit_accepted() {
    let app = setup_test_app().await;
    let data = fixtures::patterned_bytes(10 * MIB);

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(image_form("large.jpg", "image/jpeg", data.clone()))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["size"], 10 * MIB);
    let key = body["key"].as_str().unwrap();
    let stored = std::fs::read(app.temp_dir.path().join(key)).unwrap();
    assert!(stored == data);
}

#[tokio::test]
async fn test_upload_over_limit_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(image_form(
            "large.jpg",
            "image/jpeg",
            fixtures::patterned_bytes(10 * MIB + 1),
        ))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "File too large. Maximum size is 10MB.");
}

#[tokio::test]
async fn test_upload_over_limit_non_image_reports_size() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(image_form(
            "archive.zip",
            "application/zip",
            fixtures::patterned_bytes(11 * MIB),
        ))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "File too large. Maximum size is 10MB.");
}

#[tokio::test]
async fn test_upload_limit_follows_config() {
    let app = setup_test_app_with(&[("MAX_UPLOAD_SIZE_MB", "1")]).await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .multipart(image_form(
            "photo.png",
            "image/png",
            fixtures::patterned_bytes(MIB + 1),
        ))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "File too large. Maximum size is 1MB.");
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = setup_test_app().await;
    let form = MultipartForm::new().add_text("caption", "no file here");

    let response = app.client().post(&api_path("/upload")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "No image file provided");
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_under_wrong_field() {
    let app = setup_test_app().await;
    let part = Part::bytes(fixtures::create_minimal_png())
        .file_name("pixel.png")
        .mime_type("image/png");
    let form = MultipartForm::new().add_part("file", part);

    let response = app.client().post(&api_path("/upload")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Upload error: Unexpected field 'file'");
}

#[tokio::test]
async fn test_upload_non_multipart_body() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload"))
        .json(&serde_json::json!({ "image": "not a file" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let message = body["message"].as_str().expect("Expected 'message'");
    assert!(message.starts_with("Upload error: "), "{}", message);
}
