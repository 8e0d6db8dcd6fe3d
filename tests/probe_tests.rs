//! Integration tests for the exporter's HTTP surface.
//!
//! These tests drive the real router with in-process requests. The probed
//! device is simulated by a canned-response TCP server listening on an
//! ephemeral local port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use prometheus::{Counter, Registry};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

use shelly_exporter::client::DeviceClient;
use shelly_exporter::config::Config;
use shelly_exporter::handlers;
use shelly_exporter::state::{AppState, SharedState};

const REFERENCE_STATUS: &str = r#"{"wifi_sta":{"connected":true,"ssid":"home","ip":"10.0.0.5","rssi":-42},"relays":[{"ison":true},{"ison":false}],"meters":[{"power":12.5}],"uptime":3600,"temperature":23.4}"#;

/// Builds the real router over a fresh state, returning both so tests can
/// inspect the hit counter directly.
fn test_app() -> (Router, SharedState) {
    let registry = Registry::new();
    let hit_counter = Counter::new(
        "hit_counter",
        "Hits to the /probe endpoint since application start",
    )
    .unwrap();
    registry.register(Box::new(hit_counter.clone())).unwrap();

    let client = DeviceClient::new(Duration::from_secs(2)).unwrap();

    let state = Arc::new(AppState {
        registry,
        hit_counter,
        client,
        config: Arc::new(Config::default()),
    });

    (handlers::router(state.clone()), state)
}

/// Formats a minimal HTTP/1.1 response with the given status line and body.
fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

/// Starts a mock device that answers every connection with `response`.
async fn spawn_device(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            // Drain the request headers before answering.
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                match socket.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&chunk[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

/// Reserves a local port nobody is listening on.
async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_probe_success_renders_device_metrics() {
    let device = spawn_device(http_response("200 OK", REFERENCE_STATUS)).await;
    let (app, state) = test_app();

    let (status, body) = get(&app, &format!("/probe?target={}", device)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"shelly_wifi_rssi{ip="10.0.0.5",ssid="home"} -42"#));
    assert!(body.contains(r#"shelly_uptime_seconds{ip="10.0.0.5"} 3600"#));
    assert!(body.contains(r#"shelly_temperature_celsius{ip="10.0.0.5"} 23.4"#));
    assert!(body.contains(r#"shelly_relay_status{ip="10.0.0.5",relay="0"} 1"#));
    assert!(body.contains(r#"shelly_relay_status{ip="10.0.0.5",relay="1"} 0"#));
    assert!(body.contains(r#"shelly_meter_power_watts{ip="10.0.0.5",meter="0"} 12.5"#));
    assert_eq!(state.hit_counter.get(), 1.0);
}

#[tokio::test]
async fn test_probe_unreachable_target_returns_500() {
    let addr = unreachable_addr().await;
    let (app, state) = test_app();

    let (status, body) = get(&app, &format!("/probe?target={}", addr)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body.contains("Failed to get status from Shelly device"),
        "unexpected body: {}",
        body
    );
    // Failed scrapes are still counted.
    assert_eq!(state.hit_counter.get(), 1.0);
}

#[tokio::test]
async fn test_probe_upstream_404_surfaces_status_text() {
    let device = spawn_device(http_response("404 Not Found", "")).await;
    let (app, _state) = test_app();

    let (status, body) = get(&app, &format!("/probe?target={}", device)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("404"), "unexpected body: {}", body);
}

#[tokio::test]
async fn test_probe_non_json_body_returns_generic_decode_error() {
    let device = spawn_device(http_response("200 OK", "not json at all")).await;
    let (app, _state) = test_app();

    let (status, body) = get(&app, &format!("/probe?target={}", device)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body.contains("Failed to unmarshal JSON response"),
        "unexpected body: {}",
        body
    );
    // The serde detail goes to the log, never to the client.
    assert!(!body.contains("expected"));
}

#[tokio::test]
async fn test_probe_without_target_fails_at_fetch() {
    let (app, state) = test_app();

    let (status, body) = get(&app, "/probe").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Failed to get status from Shelly device"));
    assert_eq!(state.hit_counter.get(), 1.0);
}

#[tokio::test]
async fn test_hit_counter_counts_every_probe() {
    let device = spawn_device(http_response("200 OK", REFERENCE_STATUS)).await;
    let unreachable = unreachable_addr().await;
    let (app, state) = test_app();

    let (ok_status, _) = get(&app, &format!("/probe?target={}", device)).await;
    let (err_status, _) = get(&app, &format!("/probe?target={}", unreachable)).await;
    let (ok_again, _) = get(&app, &format!("/probe?target={}", device)).await;

    assert_eq!(ok_status, StatusCode::OK);
    assert_eq!(err_status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ok_again, StatusCode::OK);
    assert_eq!(state.hit_counter.get(), 3.0);
}

#[tokio::test]
async fn test_metrics_exposes_only_the_hit_counter() {
    let device = spawn_device(http_response("200 OK", REFERENCE_STATUS)).await;
    let (app, _state) = test_app();

    let (probe_status, _) = get(&app, &format!("/probe?target={}", device)).await;
    assert_eq!(probe_status, StatusCode::OK);

    let (status, body) = get(&app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("hit_counter 1"), "unexpected body: {}", body);
    // Device metrics must never leak into the process-wide registry.
    assert!(!body.contains("shelly_"), "unexpected body: {}", body);
}

#[tokio::test]
async fn test_repeated_probes_of_unchanged_device_are_identical() {
    let device = spawn_device(http_response("200 OK", REFERENCE_STATUS)).await;
    let (app, _state) = test_app();

    let (_, first) = get(&app, &format!("/probe?target={}", device)).await;
    let (_, second) = get(&app, &format!("/probe?target={}", device)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_root_returns_usage_text() {
    let (app, _state) = test_app();

    let (status, body) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/probe?target="));
    assert!(body.contains("/metrics"));
}
