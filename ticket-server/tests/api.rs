//! HTTP API tests over in-memory printer transports

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use base64::Engine as _;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use ticket_printer::transport::MemoryTransport;
use ticket_printer::{PrinterDescriptor, TransportKind, Transports};
use ticket_server::store::{JsonFileStore, PosStore};
use ticket_server::{Config, ServerState};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: ServerState,
    system: MemoryTransport,
    _dir: TempDir,
}

async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pos.json");
    let store = JsonFileStore::open(&path).await.unwrap();

    store
        .save_business_config(
            serde_json::from_value(json!({ "business_name": "Kiosco Central" })).unwrap(),
        )
        .await
        .unwrap();
    store
        .put_sale(
            serde_json::from_value(json!({
                "id": 42,
                "created_at": "2024-03-05T14:30:00",
                "items": [{ "name": "Cafe", "quantity": 2, "unit_price": 10 }],
                "payment_method": "Efectivo"
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let usb = MemoryTransport::new(TransportKind::Usb)
        .with_printer(PrinterDescriptor::usb(0x04b8, 0x0e15, "Epson"));
    let system = MemoryTransport::new(TransportKind::System)
        .with_printer(PrinterDescriptor::system("POS-80", "Windows Printer"));

    let config = Config::with_overrides(path.to_string_lossy(), 0);
    let state = ServerState::with_transports(
        config,
        Arc::new(store),
        Transports::new(Arc::new(usb), Arc::new(system.clone())),
    );

    TestApp {
        app: ticket_server::api::build_router(state.clone()),
        state,
        system,
        _dir: dir,
    }
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let t = setup().await;
    let (status, body) = call(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["printer_connected"], false);
}

#[tokio::test]
async fn test_detect_lists_usb_then_system() {
    let t = setup().await;
    let (status, body) = call(&t.app, "GET", "/api/printer/detect", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    let printers = body["data"].as_array().unwrap();
    assert_eq!(printers.len(), 2);
    assert_eq!(printers[0]["path"], "USB:1208:3605");
    assert_eq!(printers[0]["type"], "USB");
    assert_eq!(printers[0]["manufacturer"], "Epson");
    assert!(printers[0].get("address").is_none());
    assert_eq!(printers[1]["name"], "POS-80");
    assert_eq!(printers[1]["path"], "POS-80");
    assert_eq!(printers[1]["type"], "WINDOWS");
    assert_eq!(printers[1]["manufacturer"], "Windows Printer");
}

#[tokio::test]
async fn test_connect_then_status() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "POS-80" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["connected"], true);

    let (_, body) = call(&t.app, "GET", "/api/printer/status", None).await;
    assert_eq!(body["data"]["connected"], true);
    assert_eq!(body["data"]["portName"], "POS-80");

    let ticket = t.state.store.ticket_config().await.unwrap().unwrap();
    assert_eq!(ticket.printer_name.as_deref(), Some("POS-80"));
}

#[tokio::test]
async fn test_connect_unknown_printer_fails() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "Nowhere" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "E5002");

    let (_, body) = call(&t.app, "GET", "/api/printer/status", None).await;
    assert_eq!(body["data"]["connected"], false);
}

#[tokio::test]
async fn test_connect_requires_name() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn test_print_without_printer_returns_commands() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/ticket/print",
        Some(json!({ "saleId": 42 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["saleId"], 42);
    assert_eq!(body["data"]["method"], "browser_print");
    let commands = body["data"]["commands"].as_str().unwrap();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(commands)
        .unwrap();
    assert_eq!(&bytes[..2], &[0x1B, 0x40]);
}

#[tokio::test]
async fn test_print_direct_when_connected() {
    let t = setup().await;
    call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "POS-80" })),
    )
    .await;

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/ticket/print",
        Some(json!({ "saleId": 42 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["method"], "direct_print");
    assert!(body["data"].get("commands").is_none());
    assert_eq!(t.system.stats().writes, 1);
}

#[tokio::test]
async fn test_print_missing_sale() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/ticket/print",
        Some(json!({ "saleId": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn test_preview_shows_ticket_text() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/ticket/preview",
        Some(json!({ "saleId": 42 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = body["data"]["text"].as_str().unwrap();
    assert!(text.contains("Kiosco Central"));
    assert!(text.contains("Cafe"));
    assert!(text.contains("$20.00"));
}

#[tokio::test]
async fn test_test_print_requires_connection() {
    let t = setup().await;
    let (status, body) = call(&t.app, "POST", "/api/printer/test", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E5001");

    call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "POS-80" })),
    )
    .await;
    let (status, _) = call(&t.app, "POST", "/api/printer/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.system.stats().writes, 1);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let t = setup().await;
    let (status, body) = call(&t.app, "POST", "/api/printer/disconnect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["connected"], false);

    call(
        &t.app,
        "POST",
        "/api/printer/connect",
        Some(json!({ "printerName": "POS-80" })),
    )
    .await;
    let (_, body) = call(&t.app, "POST", "/api/printer/disconnect", None).await;
    assert_eq!(body["data"]["connected"], false);
    assert_eq!(t.system.stats().closes, 1);
}

#[tokio::test]
async fn test_ticket_config_validation() {
    let t = setup().await;
    let (status, body) = call(
        &t.app,
        "PUT",
        "/api/config/ticket",
        Some(json!({ "paper_width": 72 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, body) = call(
        &t.app,
        "PUT",
        "/api/config/ticket",
        Some(json!({ "paper_width": "wide" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, body) = call(
        &t.app,
        "PUT",
        "/api/config/ticket",
        Some(json!({ "paper_width": 58, "show_qr": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paper_width"], 58);
}

#[tokio::test]
async fn test_business_config_roundtrip() {
    let t = setup().await;
    let (status, _) = call(
        &t.app,
        "PUT",
        "/api/config/business",
        Some(json!({ "business_name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &t.app,
        "PUT",
        "/api/config/business",
        Some(json!({ "business_name": "Almacen", "business_cuit": "20-12345678-9" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&t.app, "GET", "/api/config/all", None).await;
    assert_eq!(body["data"]["business"]["business_name"], "Almacen");
    assert_eq!(body["data"]["ticket"]["paper_width"], 80);
}
