//! Fleet-wide health endpoint.

use crate::aggregator::UpstreamError;
use crate::api::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// GET /health - Always a well-formed summary.
///
/// An upstream that answered with a non-2xx status yields 502; an upstream
/// that could not be reached at all still yields 200 with an empty summary.
pub async fn handle(State(state): State<Arc<AppState>>) -> Response {
    let (status, summary) = match state.aggregator.fleet_health().await {
        Ok(summary) => (StatusCode::OK, summary),
        Err(e) => {
            tracing::warn!(error = %e, "Fleet health unavailable");
            let status = match e {
                UpstreamError::Status(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::OK,
            };
            (status, e.into_summary())
        }
    };

    (status, [(header::CACHE_CONTROL, "no-store")], Json(summary)).into_response()
}
