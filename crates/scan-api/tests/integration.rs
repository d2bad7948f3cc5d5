//! Integration tests: scan, register, relay updates/reads, error mapping.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use scan_api::server::{self, AppState};
use scan_glpi::MockInventory;
use scan_pipeline::AssetPipeline;
use scan_types::AssetInventory;
use scan_vision::{ImageQrDecoder, MockOcr, MockQrDecoder};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

const LABEL_TEXT: &str = "Brand: Dell\nModel: Latitude 5420\nSerial Number: 7GHJK92";
const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn test_app(inventory: Option<Arc<MockInventory>>) -> axum::Router {
    let inventory = inventory.map(|i| i as Arc<dyn AssetInventory>);
    let pipeline = AssetPipeline::new(
        Arc::new(MockOcr::new(LABEL_TEXT)),
        Arc::new(MockQrDecoder::new(Some("ASSET-0042"))),
        inventory,
    );
    server::router(Arc::new(AppState { pipeline }))
}

/// App wired to the real image decoder, for exercising bad-upload paths.
fn test_app_real_decoder() -> axum::Router {
    let pipeline = AssetPipeline::new(
        Arc::new(MockOcr::new(LABEL_TEXT)),
        Arc::new(ImageQrDecoder::new()),
        None,
    );
    server::router(Arc::new(AppState { pipeline }))
}

/// Build a multipart/form-data body: (field, optional filename, content).
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, value)
}

fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let (content_type, body) = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app(None);
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["status"], "ok");
}

#[tokio::test]
async fn config_reflects_inventory_presence() {
    let req = Request::builder()
        .uri("/api/config")
        .body(Body::empty())
        .unwrap();
    let (status, j) = send(test_app(None), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["glpi_enabled"], false);

    let req = Request::builder()
        .uri("/api/config")
        .body(Body::empty())
        .unwrap();
    let (_, j) = send(test_app(Some(Arc::new(MockInventory::new()))), req).await;
    assert_eq!(j["glpi_enabled"], true);
}

#[tokio::test]
async fn scan_qr_returns_decoded_value() {
    let app = test_app(None);
    let req = multipart_request(
        "/api/scan_qr",
        &[("file", Some("qr.png"), b"fake image bytes")],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["qr_value"], "ASSET-0042");
}

#[tokio::test]
async fn scan_qr_requires_the_file_field() {
    let app = test_app(None);
    let req = multipart_request(
        "/api/scan_qr",
        &[("other", Some("qr.png"), b"fake image bytes")],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(j["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn scan_qr_rejects_undecodable_image() {
    let app = test_app_real_decoder();
    let req = multipart_request(
        "/api/scan_qr",
        &[("file", Some("junk.bin"), b"definitely not an image")],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(j["detail"].as_str().unwrap().contains("cannot open image"));
}

#[tokio::test]
async fn add_entry_classifies_and_creates() {
    let inventory = Arc::new(MockInventory::new());
    let app = test_app(Some(Arc::clone(&inventory)));
    let req = multipart_request(
        "/api/add_entry",
        &[
            ("spec_image", Some("label.jpg"), b"label photo"),
            ("qr_image", Some("qr.jpg"), b"qr photo"),
            ("item_type", None, b"auto"),
        ],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["created"], true);
    assert_eq!(j["target_item_type"], "Computer");
    assert_eq!(j["classification"]["category"], "Laptop");
    assert_eq!(j["payload"]["name"], "Latitude 5420");
    assert_eq!(j["payload"]["serial"], "7GHJK92");
    let comment = j["payload"]["comment"].as_str().unwrap();
    assert!(comment.contains("Manufacturer: Dell"));
    assert!(comment.contains("QR: ASSET-0042"));
    assert_eq!(j["glpi"]["id"], 1);
    assert_eq!(
        inventory.calls().await,
        vec!["init_session", "create_item", "kill_session"]
    );
}

#[tokio::test]
async fn add_entry_with_explicit_item_type() {
    let inventory = Arc::new(MockInventory::new());
    let app = test_app(Some(Arc::clone(&inventory)));
    let req = multipart_request(
        "/api/add_entry",
        &[
            ("spec_image", Some("label.jpg"), b"label photo"),
            ("item_type", None, b"Printer"),
        ],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["target_item_type"], "Printer");
    assert_eq!(j["classification"]["category"], "Unspecified");
    let stored = inventory.item(1).await.unwrap();
    assert_eq!(stored["itemtype"], "Printer");
}

#[tokio::test]
async fn add_entry_rejects_unknown_item_type() {
    let app = test_app(Some(Arc::new(MockInventory::new())));
    let req = multipart_request(
        "/api/add_entry",
        &[
            ("spec_image", Some("label.jpg"), b"label photo"),
            ("item_type", None, b"Teapot"),
        ],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(j["detail"].as_str().unwrap().contains("Teapot"));
}

#[tokio::test]
async fn add_entry_requires_spec_image() {
    let app = test_app(Some(Arc::new(MockInventory::new())));
    let req = multipart_request("/api/add_entry", &[("item_type", None, b"auto")]);
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(j["detail"].as_str().unwrap().contains("spec_image"));
}

#[tokio::test]
async fn add_entry_without_inventory_is_a_server_error() {
    let app = test_app(None);
    let req = multipart_request(
        "/api/add_entry",
        &[("spec_image", Some("label.jpg"), b"label photo")],
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(j["detail"]
        .as_str()
        .unwrap()
        .contains("GLPI configuration missing"));
}

#[tokio::test]
async fn change_location_resolves_by_qr() {
    let inventory = Arc::new(MockInventory::new().with_search_hits(vec![5, 6]));
    inventory.insert(5, json!({ "id": 5, "name": "pc-5" })).await;
    let app = test_app(Some(Arc::clone(&inventory)));
    let req = json_request(
        "/api/change_location",
        json!({ "qr_value": "pc-5", "location_id": 3 }),
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["updated"], true);
    assert_eq!(j["item_id"], 5);
    assert_eq!(inventory.item(5).await.unwrap()["locations_id"], 3);
}

#[tokio::test]
async fn change_user_by_explicit_id() {
    let inventory = Arc::new(MockInventory::new());
    inventory.insert(7, json!({ "id": 7, "name": "pc-7" })).await;
    let app = test_app(Some(Arc::clone(&inventory)));
    let req = json_request("/api/change_user", json!({ "item_id": 7, "user_id": 12 }));
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["item_id"], 7);
    assert_eq!(inventory.item(7).await.unwrap()["users_id"], 12);
}

#[tokio::test]
async fn check_entry_relays_the_item() {
    let inventory = Arc::new(MockInventory::new().with_search_hits(vec![5]));
    inventory.insert(5, json!({ "id": 5, "name": "pc-5" })).await;
    let app = test_app(Some(Arc::clone(&inventory)));
    let req = json_request("/api/check_entry", json!({ "qr_value": "pc-5" }));
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["exists"], true);
    assert_eq!(j["item_id"], 5);
    assert_eq!(j["glpi"]["name"], "pc-5");
}

#[tokio::test]
async fn check_entry_unknown_qr_is_404() {
    let inventory = Arc::new(MockInventory::new());
    let app = test_app(Some(inventory));
    let req = json_request("/api/check_entry", json!({ "qr_value": "nope" }));
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(j["detail"].as_str().unwrap().contains("No matching item"));
}

#[tokio::test]
async fn check_entry_without_selector_is_400() {
    let app = test_app(Some(Arc::new(MockInventory::new())));
    let req = json_request("/api/check_entry", json!({}));
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(j["detail"]
        .as_str()
        .unwrap()
        .contains("item_id or qr_value"));
}

#[tokio::test]
async fn upstream_failure_is_relayed_as_bad_gateway() {
    // Updating an id the backend does not know fails upstream.
    let inventory = Arc::new(MockInventory::new());
    let app = test_app(Some(inventory));
    let req = json_request(
        "/api/change_location",
        json!({ "item_id": 99, "location_id": 3 }),
    );
    let (status, j) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(j["detail"].as_str().unwrap().contains("404"));
}
