//! Clinic API Server
//!
//! Serves the clinic REST API: staff login and registration, and patient
//! records gated by role.
//!
//! # Usage
//!
//! ```bash
//! # Start with a signing secret from the environment
//! JWT_SECRET=... clinic-server
//!
//! # Start with a config file
//! clinic-server --config /path/to/config.toml
//!
//! # Environment overrides
//! CLINIC__SERVER__PORT=9000 clinic-server
//! ```

mod config;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clinic_api::{create_router, AppState};
use clinic_auth::AuthService;
use clinic_db::Database;
use clinic_types::Role;

use crate::config::ServerConfig;

/// Accounts created on first boot so a fresh install can log in
const DEFAULT_STAFF: [(&str, Role); 2] = [
    ("receptionist", Role::Receptionist),
    ("doctor", Role::Doctor),
];
const DEFAULT_STAFF_PASSWORD: &str = "password";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Clinic API Server
#[derive(Parser, Debug)]
#[command(name = "clinic-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "CLINIC_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Skip creating the default staff accounts
    #[arg(long)]
    no_seed: bool,
}

impl Args {
    /// Apply CLI overrides on top of the loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(db_url) = self.database_url {
            config.database.postgres_url = db_url;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt_secret = secret;
        }
        if self.no_seed {
            config.auth.seed_default_users = false;
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting clinic server"
    );

    // Missing signing secret is fatal
    server_config.validate()?;

    let db = init_database(&server_config.database).await?;
    let auth = init_auth(&server_config, &db).await?;

    let patients = Arc::new(db.patient_repo());
    let state = Arc::new(AppState::new(auth, patients).with_database(db));

    let app = create_router(state, server_config.api.clone());

    if server_config.metrics.enabled {
        start_metrics_exporter(server_config.metrics.port)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // New connections stop at the signal; in-flight requests get the drain window
    tokio::select! {
        result = server.into_future() => {
            result?;
            tracing::info!("Server shutdown complete");
        }
        _ = drain_deadline(shutdown_rx, server_config.server.shutdown_timeout()) => {
            tracing::warn!(
                timeout_secs = server_config.server.shutdown_timeout().as_secs(),
                "Shutdown timeout elapsed with requests still in flight"
            );
        }
    }

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging. `RUST_LOG` wins over the configured level.
fn init_logging(config: &config::LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }
}

/// Connect to PostgreSQL and bring the schema up to date
async fn init_database(config: &config::DatabaseSettings) -> anyhow::Result<Arc<Database>> {
    let db = Database::connect(&config.to_db_config()).await?;

    if config.run_migrations {
        db.migrate().await?;
    }

    let health = db.health_check().await;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    Ok(Arc::new(db))
}

/// Build the auth service over the Postgres user directory
async fn init_auth(config: &ServerConfig, db: &Database) -> anyhow::Result<Arc<AuthService>> {
    let auth = AuthService::new(Arc::new(db.user_repo()), config.auth.to_auth_config())?;

    if config.auth.seed_default_users {
        seed_default_staff(&auth).await?;
    }

    Ok(Arc::new(auth))
}

/// Create the default staff accounts that do not exist yet
async fn seed_default_staff(auth: &AuthService) -> anyhow::Result<()> {
    for (username, role) in DEFAULT_STAFF {
        let created = auth
            .credentials
            .ensure_user(username, DEFAULT_STAFF_PASSWORD, role)
            .await?;
        if created {
            tracing::warn!(
                username,
                role = %role,
                "Created default account with a well-known password; change or disable it"
            );
        }
    }
    Ok(())
}

/// Install the Prometheus exporter on its own port
fn start_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port, "Metrics exporter started");
    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Resolves `timeout` after shutdown has been signalled; never resolves if it
/// is not. Bounds how long in-flight requests may drain.
async fn drain_deadline(mut shutdown: watch::Receiver<bool>, timeout: Duration) {
    if shutdown.wait_for(|signalled| *signalled).await.is_err() {
        std::future::pending::<()>().await;
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );
    tokio::time::sleep(timeout).await;
}

// =============================================================================
// Tests
// =============================================================================
