//! Pharmacy Claims - API Server Binary
//!
//! Waits for the database, applies migrations, seeds empty tables from the
//! data directory, then serves the claims API. Seeding problems are logged
//! and do not block startup.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin pharmacy-claims-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATA_DIR=./data DATABASE_URL=postgres://... cargo run --bin pharmacy-claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `DATABASE_URL` / `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DATA_DIR` - Seed data root (default: ./data)
//! * `API_LOG_DIR` - Audit event directory (default: ./logs)
//! * `API_BATCH_SIZE` - Rows per seed transaction, 1..=10000 (default: 1000)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `API_DB_MAX_CONNECTIONS`, `API_DB_CONNECT_RETRIES`, `API_DB_RETRY_INTERVAL_SECS`
//! * `API_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::AuditSink;
use domain_claims::{ClaimValidator, ClaimsPort, ClaimsService};
use infra_db::{create_pool, run_migrations, wait_for_database, PostgresClaimsAdapter};
use infra_loader::Loader;
use interface_api::audit::FileAuditSink;
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, AppState};

const AUDIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The database never becomes ready or migrations fail
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        data_dir = %config.data_dir.display(),
        "Starting Pharmacy Claims API Server"
    );

    wait_for_database(
        &config.database_url,
        config.db_connect_retries,
        config.db_retry_interval(),
    )
    .await?;

    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;

    let (audit_sink, audit_writer) = FileAuditSink::spawn(&config.log_dir);
    let audit: Arc<dyn AuditSink> = Arc::new(audit_sink);
    let port: Arc<dyn ClaimsPort> = Arc::new(PostgresClaimsAdapter::new(pool));
    let validator = ClaimValidator::new();

    seed(&config, port.clone(), audit.clone(), validator).await;

    let service = Arc::new(ClaimsService::new(port, audit, validator));
    let app = create_router(AppState::new(service).with_request_timeout(config.request_timeout()));

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Router and service are gone, so the writer drains and exits
    if tokio::time::timeout(AUDIT_FLUSH_TIMEOUT, audit_writer).await.is_err() {
        tracing::warn!("Timed out flushing audit events");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Seeds empty tables; failures are logged and never stop startup
async fn seed(
    config: &ApiConfig,
    port: Arc<dyn ClaimsPort>,
    audit: Arc<dyn AuditSink>,
    validator: ClaimValidator,
) {
    let loader = Loader::new(port, audit, validator).with_batch_size(config.batch_size);

    for (table, result) in loader.load_all(&config.data_dir).await {
        match result {
            Ok(report) => tracing::info!(%table, inserted = report.inserted, "Seeding finished"),
            Err(e) => tracing::warn!(%table, error = %e, "Seeding failed, continuing startup"),
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
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
