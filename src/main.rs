//! FinBridge gateway server
//!
//! Boots the configuration, the audit worker, and the rate-limiter eviction
//! task, then serves the guarded router until shutdown.

use std::net::SocketAddr;

use finbridge_gateway::app_state::AppState;
use finbridge_gateway::audit::spawn_audit_worker;
use finbridge_gateway::config::Config;
use finbridge_gateway::middleware::rate_limiter::spawn_eviction;
use finbridge_gateway::pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(
        environment = config.environment.as_str(),
        port = config.port,
        rate_limit = config.rate_limit_requests,
        window_secs = config.rate_limit_window_secs,
        "starting gateway"
    );

    let audit = spawn_audit_worker(config.audit_sink_url.clone());
    let state = AppState::new(config, audit);

    // Idle client windows are reclaimed on the same cadence as the window
    // itself.
    spawn_eviction(
        state.rate_limiter.clone(),
        state.config.rate_limit_window(),
    );

    let app = pipeline::app(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
