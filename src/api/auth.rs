//! Password and observer-approval login.

use crate::api::{ApiError, AppState};
use crate::approval::ApprovalError;
use crate::session::SessionToken;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use std::sync::Arc;
use std::time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "fleetwatch_session";

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub action: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub action: Option<String>,
    pub password: Option<String>,
}

/// `Set-Cookie` value for a freshly issued session.
pub fn session_cookie(token: &SessionToken, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token.as_str(),
        ttl.as_secs()
    )
}

/// Session token from the cookie header or an `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    })
}

/// First hop of `X-Forwarded-For`, or `unknown`.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn with_cookie(state: &AppState, token: &SessionToken, body: serde_json::Value) -> Response {
    let cookie = session_cookie(token, state.sessions.ttl());
    match HeaderValue::from_str(&cookie) {
        Ok(value) => ([(header::SET_COOKIE, value)], Json(body)).into_response(),
        Err(e) => ApiError::internal(format!("Invalid session cookie: {}", e)).into_response(),
    }
}

/// GET /auth?action=check|poll
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AuthQuery>,
) -> Result<Response, ApiError> {
    match query.action.as_deref() {
        Some("check") => {
            let authenticated = session_token(&headers)
                .map(|token| state.sessions.validate(&token))
                .unwrap_or(false);
            Ok(Json(json!({ "authenticated": authenticated })).into_response())
        }
        Some("poll") => {
            let session_id = query
                .session_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ApiError::bad_request("Missing session_id"))?;
            poll(&state, &session_id).await
        }
        _ => Err(ApiError::bad_request("Unknown action")),
    }
}

async fn poll(state: &AppState, session_id: &str) -> Result<Response, ApiError> {
    match state.approvals.poll(session_id).await {
        Ok(response) => {
            let body = json!({ "status": response.status });
            Ok(match response.token {
                Some(token) => with_cookie(state, &token, body),
                None => Json(body).into_response(),
            })
        }
        Err(ApprovalError::ObserverUnreachable(_)) => {
            Ok((StatusCode::BAD_GATEWAY, Json(json!({ "status": "error" }))).into_response())
        }
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

/// POST /auth {action: "password" | "unlock"}
pub async fn post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;

    match request.action.as_deref() {
        Some("password") => {
            let password = request
                .password
                .ok_or_else(|| ApiError::bad_request("Missing password"))?;
            password_login(&state, &password)
        }
        Some("unlock") => {
            let ip = client_ip(&headers);
            match state.approvals.start(&ip).await {
                Ok(ticket) => Ok(Json(ticket).into_response()),
                Err(_) => Err(ApiError::bad_gateway("Observer unreachable")),
            }
        }
        _ => Err(ApiError::bad_request("Unknown action")),
    }
}

fn password_login(state: &AppState, password: &str) -> Result<Response, ApiError> {
    let Some(expected) = state.config.auth.password() else {
        tracing::warn!(
            env = %state.config.auth.password_env,
            "Password login attempted but no password is configured"
        );
        return Ok(invalid_password());
    };

    if !password_matches(password, &expected) {
        tracing::warn!("Invalid password attempt");
        return Ok(invalid_password());
    }

    let token = state
        .sessions
        .issue()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    tracing::info!("Password login succeeded");
    Ok(with_cookie(state, &token, json!({ "authenticated": true })))
}

/// Constant-time comparison; the running time does not depend on where the
/// inputs first differ.
fn password_matches(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn invalid_password() -> Response {
    Json(json!({ "authenticated": false, "error": "Invalid password" })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_session_token_from_cookie() {
        let h = headers(&[("cookie", "theme=dark; fleetwatch_session=abc123; other=1")]);
        assert_eq!(session_token(&h).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_bearer() {
        let h = headers(&[("authorization", "Bearer xyz")]);
        assert_eq!(session_token(&h).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_session_token_absent() {
        let h = headers(&[("cookie", "theme=dark")]);
        assert_eq!(session_token(&h), None);
    }

    #[test]
    fn test_password_matches() {
        assert!(password_matches("hunter22", "hunter22"));
        assert!(!password_matches("hunter23", "hunter22"));
        assert!(!password_matches("hunter2", "hunter22"));
        assert!(!password_matches("", "hunter22"));
    }

    #[test]
    fn test_client_ip_first_forwarded_hop() {
        let h = headers(&[("x-forwarded-for", "203.0.113.9, 10.0.0.1")]);
        assert_eq!(client_ip(&h), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
