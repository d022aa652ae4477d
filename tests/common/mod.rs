//! Shared test utilities for fleetwatch integration tests.
//!
//! Provides local mock services, fleet configs pointed at them, and helpers
//! for driving the router without a socket.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use fleetwatch::api::{create_router, AppState};
use fleetwatch::config::{FleetwatchConfig, MachineConfig, ProbeConfig, ServiceConfig};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// Loopback host every mock service listens on
pub const LOCAL_HOST: &str = "127.0.0.1";

/// Port nothing listens on; connects are refused, which counts as reachable
pub const CLOSED_PORT: u16 = 1;

/// Session token length: 32 random bytes, hex encoded
pub const TOKEN_HEX_LEN: usize = 64;

// =============================================================================
// Mock Services
// =============================================================================

/// Service answering `GET /health` with 200 after `delay`.
pub async fn mock_service(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "ok", "version": "1.4.2"}))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

/// Port of a running mock server.
pub fn port_of(server: &MockServer) -> u16 {
    server.address().port()
}

// =============================================================================
// Config Builders
// =============================================================================

/// Tight probe settings: 100ms slow threshold, 400ms hard timeout.
pub fn fast_probe_config() -> ProbeConfig {
    ProbeConfig {
        timeout_ms: 400,
        slow_threshold_ms: 100,
        host_check_port: CLOSED_PORT,
        host_timeout_ms: 300,
    }
}

/// Loopback machine whose services are `(name, port)` pairs.
pub fn local_machine(id: &str, services: &[(&str, u16)]) -> MachineConfig {
    MachineConfig {
        id: id.to_string(),
        host: LOCAL_HOST.to_string(),
        label: None,
        services: services
            .iter()
            .map(|(name, port)| ServiceConfig::new(name, *port, "/health"))
            .collect(),
    }
}

/// Config over `machines` with fast probes and the session gate off.
pub fn open_config(machines: Vec<MachineConfig>) -> FleetwatchConfig {
    let mut config = FleetwatchConfig::default();
    config.probe = fast_probe_config();
    config.auth.require_session = false;
    config.machines = machines;
    config
}

// =============================================================================
// Router Helpers
// =============================================================================

pub fn make_app(config: FleetwatchConfig) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Arc::new(config)));
    (create_router(Arc::clone(&state)), state)
}

pub async fn send(app: &mut axum::Router, request: Request<Body>) -> Response<Body> {
    app.call(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value of the `fleetwatch_session` cookie in a `Set-Cookie` header.
pub fn session_cookie_value<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .and_then(|pair| pair.strip_prefix("fleetwatch_session="))
        .map(str::to_string)
}
