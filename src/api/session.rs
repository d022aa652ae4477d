//! Session gate for protected routes.

use crate::api::{auth::session_token, ApiError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Reject requests without a valid session when `auth.require_session` is on.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.auth.require_session {
        return next.run(request).await;
    }

    let valid = session_token(request.headers())
        .map(|token| state.sessions.validate(&token))
        .unwrap_or(false);

    if valid {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Rejected request without valid session");
        ApiError::unauthorized().into_response()
    }
}
