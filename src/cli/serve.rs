//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{FleetwatchConfig, LogFormat};
use crate::feed::FeedRelay;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<FleetwatchConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        FleetwatchConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        FleetwatchConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides win over everything else
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_feed {
        config.feed.url = None;
    }
    if args.no_auth {
        config.auth.require_session = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!(
        machines = config.machines.len(),
        require_session = config.auth.require_session,
        "Starting fleetwatch dashboard"
    );
    tracing::debug!(?config, "Loaded configuration");

    if config.auth.require_session && config.auth.password().is_none() {
        tracing::warn!(
            env = %config.auth.password_env,
            "No dashboard password configured; only observer approval can unlock"
        );
    }

    let app_state = Arc::new(AppState::new(Arc::new(config.clone())));
    app_state.metrics_collector.update_fleet_gauges();
    let app = create_router(Arc::clone(&app_state));

    let cancel_token = CancellationToken::new();
    let feed_handle = match FeedRelay::from_config(&config.feed, app_state.feed.clone()) {
        Some(relay) => {
            tracing::info!("Starting live feed relay");
            Some(relay.start(cancel_token.clone()))
        }
        None => {
            tracing::info!("Live feed relay disabled");
            None
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "fleetwatch dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    if let Some(handle) = feed_handle {
        tracing::info!("Waiting for feed relay to stop");
        handle.await?;
    }

    tracing::info!("fleetwatch dashboard stopped");
    Ok(())
}
