//! Password login and observer approval, end to end.
//!
//! The observer is a mock server; the dashboard runs in-process.

mod common;

use axum::http::StatusCode;
use common::*;
use fleetwatch::approval::{ApprovalPoller, PollerState};
use fleetwatch::cli::unlock::DashboardClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn observer_with_status(status: &str) -> MockServer {
    let observer = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "obs-42",
            "code": "K7Q2",
            "expires_in": 300
        })))
        .mount(&observer)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/check/obs-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": status})))
        .mount(&observer)
        .await;
    observer
}

fn gated_config(observer_url: &str, password_env: &str) -> fleetwatch::config::FleetwatchConfig {
    let mut config = open_config(vec![]);
    config.auth.require_session = true;
    config.auth.observer_url = observer_url.to_string();
    config.auth.password_env = password_env.to_string();
    config
}

// =============================================================================
// Password login
// =============================================================================

#[tokio::test]
async fn test_password_login_sets_cookie_and_unlocks_health() {
    std::env::set_var("FLEETWATCH_TEST_PASSWORD_LOGIN", "hunter2");
    let (mut app, _) = make_app(gated_config("http://127.0.0.1:1", "FLEETWATCH_TEST_PASSWORD_LOGIN"));

    let response = send(
        &mut app,
        post_json("/auth", json!({"action": "password", "password": "hunter2"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=86400"));

    let token = session_cookie_value(&response).unwrap();
    assert_eq!(token.len(), TOKEN_HEX_LEN);
    assert_eq!(json_body(response).await, json!({"authenticated": true}));

    let request = axum::http::Request::builder()
        .uri("/auth?action=check")
        .header("cookie", format!("fleetwatch_session={}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(
        json_body(send(&mut app, request).await).await,
        json!({"authenticated": true})
    );

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("cookie", format!("fleetwatch_session={}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(send(&mut app, request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_password_is_rejected_without_cookie() {
    std::env::set_var("FLEETWATCH_TEST_PASSWORD_WRONG", "hunter2");
    let (mut app, state) = make_app(gated_config("http://127.0.0.1:1", "FLEETWATCH_TEST_PASSWORD_WRONG"));

    let response = send(
        &mut app,
        post_json("/auth", json!({"action": "password", "password": "guess"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
    assert_eq!(
        json_body(response).await,
        json!({"authenticated": false, "error": "Invalid password"})
    );
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_password_login_without_configured_password() {
    let (mut app, _) = make_app(gated_config("http://127.0.0.1:1", "FLEETWATCH_TEST_PASSWORD_UNSET"));

    let response = send(
        &mut app,
        post_json("/auth", json!({"action": "password", "password": ""})),
    )
    .await;
    assert_eq!(json_body(response).await["authenticated"], false);
}

#[tokio::test]
async fn test_auth_rejects_malformed_requests() {
    let (mut app, _) = make_app(gated_config("http://127.0.0.1:1", "FLEETWATCH_TEST_PASSWORD_UNSET"));

    let response = send(&mut app, post_json("/auth", json!({"action": "password"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Missing password"}));

    let response = send(&mut app, post_json("/auth", json!({"action": "dance"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Unknown action"}));

    let response = send(&mut app, get("/auth?action=poll")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Missing session_id"}));

    let response = send(&mut app, get("/auth")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Observer approval
// =============================================================================

#[tokio::test]
async fn test_unlock_relays_ticket_from_observer() {
    let observer = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/start"))
        .and(body_json(json!({
            "app_id": "fleetwatch",
            "email": "operator@localhost",
            "ip": "198.51.100.4"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "obs-42",
            "code": "K7Q2",
            "expires_in": 300
        })))
        .expect(1)
        .mount(&observer)
        .await;

    let (mut app, _) = make_app(gated_config(&observer.uri(), "FLEETWATCH_TEST_PASSWORD_UNSET"));

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/auth")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "198.51.100.4")
        .body(axum::body::Body::from(json!({"action": "unlock"}).to_string()))
        .unwrap();
    let response = send(&mut app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["session_id"], "obs-42");
    assert_eq!(body["code"], "K7Q2");
}

#[tokio::test]
async fn test_unlock_with_observer_down_is_bad_gateway() {
    let (mut app, _) = make_app(gated_config(
        &format!("http://{}:{}", LOCAL_HOST, CLOSED_PORT),
        "FLEETWATCH_TEST_PASSWORD_UNSET",
    ));

    let response = send(&mut app, post_json("/auth", json!({"action": "unlock"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await, json!({"error": "Observer unreachable"}));

    let response = send(&mut app, get("/auth?action=poll&session_id=obs-42")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await, json!({"status": "error"}));
}

#[tokio::test]
async fn test_approved_poll_issues_cookie_exactly_once() {
    let observer = observer_with_status("approved").await;
    let (mut app, state) = make_app(gated_config(&observer.uri(), "FLEETWATCH_TEST_PASSWORD_UNSET"));

    let first = send(&mut app, get("/auth?action=poll&session_id=obs-42")).await;
    assert_eq!(first.status(), StatusCode::OK);
    let token = session_cookie_value(&first).expect("first approved poll sets cookie");
    assert_eq!(json_body(first).await, json!({"status": "approved"}));
    assert!(state.sessions.validate(&token));

    let second = send(&mut app, get("/auth?action=poll&session_id=obs-42")).await;
    assert!(second.headers().get("set-cookie").is_none());
    assert_eq!(json_body(second).await, json!({"status": "approved"}));
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn test_pending_and_denied_polls_issue_nothing() {
    for status in ["pending", "denied", "expired", "not_found"] {
        let observer = observer_with_status(status).await;
        let (mut app, state) =
            make_app(gated_config(&observer.uri(), "FLEETWATCH_TEST_PASSWORD_UNSET"));

        let response = send(&mut app, get("/auth?action=poll&session_id=obs-42")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none(), "{}", status);
        assert_eq!(json_body(response).await["status"], status);
        assert!(state.sessions.is_empty());
    }
}

// =============================================================================
// Unlock client against a served dashboard
// =============================================================================

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind((LOCAL_HOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_unlock_client_reaches_approved_with_session() {
    let observer = observer_with_status("approved").await;
    let (app, state) = make_app(gated_config(&observer.uri(), "FLEETWATCH_TEST_PASSWORD_UNSET"));
    let base_url = serve(app).await;

    let client = DashboardClient::new(&base_url);
    let ticket = client.start().await.unwrap();
    assert_eq!(ticket.code, "K7Q2");

    let mut poller = ApprovalPoller::new(client);
    poller.begin(ticket);
    let outcome = tokio::time::timeout(Duration::from_secs(5), poller.run(Duration::from_millis(20)))
        .await
        .unwrap()
        .clone();
    assert_eq!(outcome, PollerState::Approved);

    let token = poller.into_source().session().unwrap();
    assert!(state.sessions.validate(&token));
}

#[tokio::test]
async fn test_unlock_client_reports_denial() {
    let observer = observer_with_status("denied").await;
    let (app, state) = make_app(gated_config(&observer.uri(), "FLEETWATCH_TEST_PASSWORD_UNSET"));
    let base_url = serve(app).await;

    let client = DashboardClient::new(&base_url);
    let ticket = client.start().await.unwrap();

    let mut poller = ApprovalPoller::new(client);
    poller.begin(ticket);
    let outcome = tokio::time::timeout(Duration::from_secs(5), poller.run(Duration::from_millis(20)))
        .await
        .unwrap()
        .clone();
    assert_eq!(outcome, PollerState::Failed("access denied".to_string()));
    assert!(state.sessions.is_empty());
}
