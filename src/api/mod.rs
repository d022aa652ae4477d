//! # Dashboard API
//!
//! HTTP endpoints over the fleet liveness core and the approval flow.
//!
//! ## Endpoints
//!
//! - `GET /health` - Fleet-wide summary (local probe round or upstream proxy)
//! - `GET /wake?machine=ID` - Probe one machine and diagnose it
//! - `POST /wake` - Read-only re-probe of one service or a whole machine
//! - `GET|POST /auth` - Session check, password login, observer approval
//! - `GET /feed/ws` - WebSocket stream of relayed live events
//! - `GET /metrics` - Prometheus text format
//!
//! `/health`, `/wake` and `/feed/ws` sit behind the session gate unless
//! `auth.require_session` is off.
//!
//! ## Example
//!
//! ```no_run
//! use fleetwatch::api::{AppState, create_router};
//! use fleetwatch::config::FleetwatchConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(FleetwatchConfig::default());
//! let state = Arc::new(AppState::new(config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod feed;
mod health;
mod session;
pub mod types;
mod wake;

pub use types::*;
pub use wake::{DiagnosedService, DiagnosisResponse};

use crate::aggregator::Aggregator;
use crate::approval::{ApprovalGateway, HttpObserver, ObserverClient};
use crate::config::FleetwatchConfig;
use crate::feed::FeedEvent;
use crate::fleet::Fleet;
use crate::metrics::MetricsCollector;
use crate::probe::Prober;
use crate::session::SessionStore;
use axum::{body::Body, http::Request, middleware, routing::get, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KB).
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<FleetwatchConfig>,
    pub fleet: Arc<Fleet>,
    pub aggregator: Arc<Aggregator>,
    pub sessions: Arc<SessionStore>,
    pub approvals: Arc<ApprovalGateway>,
    /// Live events from the feed relay; idle when no relay runs
    pub feed: broadcast::Sender<FeedEvent>,
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Build state with an HTTP observer at `auth.observer_url`.
    pub fn new(config: Arc<FleetwatchConfig>) -> Self {
        let timeout = Duration::from_secs(config.server.request_timeout_seconds);
        let observer = Arc::new(HttpObserver::new(config.auth.observer_url.clone(), timeout));
        Self::with_observer(config, observer)
    }

    /// Build state around a given observer client.
    pub fn with_observer(config: Arc<FleetwatchConfig>, observer: Arc<dyn ObserverClient>) -> Self {
        let fleet = Arc::new(Fleet::from_config(&config.machines));
        let aggregator = Arc::new(Aggregator::new(
            Arc::clone(&fleet),
            Prober::new(config.probe.clone()),
            config.aggregator.clone(),
        ));

        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.auth.session_ttl_seconds,
        )));
        let approvals = Arc::new(ApprovalGateway::new(
            observer,
            Arc::clone(&sessions),
            config.auth.app_id.clone(),
            config.auth.email.clone(),
        ));

        let (feed, _) = broadcast::channel(config.feed.buffer.max(1));

        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&fleet),
            start_time,
            crate::metrics::handle_or_detached(),
        ));

        Self {
            config,
            fleet,
            aggregator,
            sessions,
            approvals,
            feed,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/health", get(health::handle))
        .route("/wake", get(wake::diagnose_machine).post(wake::wake))
        .route("/feed/ws", get(feed::websocket_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            session::require_session,
        ));

    Router::new()
        .merge(protected)
        .route("/auth", get(auth::get).post(auth::post))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    request_id = %crate::logging::generate_request_id(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .with_state(state)
}
