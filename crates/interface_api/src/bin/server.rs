//! SAV Core - API Server Binary
//!
//! This binary starts the HTTP API server for the after-sales service back end.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin sav-api
//!
//! # Run with environment variables
//! SAV_PORT=8080 SAV_DATABASE_URL=postgres://... cargo run --bin sav-api
//! ```
//!
//! # Environment Variables
//!
//! * `SAV_HOST` - Server host (default: 0.0.0.0)
//! * `SAV_PORT` - Server port (default: 8080)
//! * `SAV_JWT_SECRET` - JWT signing secret (required in production)
//! * `SAV_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `SAV_DATABASE_URL` - PostgreSQL connection string
//! * `SAV_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `SAV_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `SAV_BUSINESS_TIMEZONE` - IANA zone for dashboard months (default: Europe/Paris)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_dashboard::DashboardService;
use domain_reclamation::ReclamationService;
use infra_db::repositories::{PostgresDashboardSource, PostgresReclamationRepository};
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid SAV_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.business_timezone.name(),
        "Starting SAV API Server"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.db_max_connections),
    )
    .await
    .context("database connection failed")?;

    run_migrations(&pool).await.context("database migrations failed")?;

    let clock = Arc::new(SystemClock);
    let reclamations = ReclamationService::new(
        Arc::new(PostgresReclamationRepository::new(pool.clone())),
        clock.clone(),
    );
    let dashboard = DashboardService::new(
        Arc::new(PostgresDashboardSource::new(pool)),
        clock,
        config.business_timezone,
    );

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    let app = create_router(AppState::new(reclamations, dashboard, config));

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
