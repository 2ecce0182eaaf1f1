//! Server Configuration
//!
//! Layered configuration for the clinic server: config files, then
//! `CLINIC__`-prefixed environment variables, then CLI flags (applied in
//! `main`).

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server binding configuration
    pub server: ServerSettings,

    /// Database configuration
    pub database: DatabaseSettings,

    /// Authentication configuration
    pub auth: AuthSettings,

    /// API configuration
    pub api: clinic_api::ApiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Grace period for in-flight requests on shutdown, in seconds
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Get the shutdown timeout duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub postgres_url: String,

    /// Maximum connections in pool
    pub max_connections: u32,

    /// Minimum connections in pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,

    /// Run migrations on startup
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let defaults = clinic_db::DatabaseConfig::default();
        Self {
            postgres_url: defaults.postgres_url,
            max_connections: defaults.pg_max_connections,
            min_connections: defaults.pg_min_connections,
            connect_timeout_secs: defaults.pg_acquire_timeout_secs,
            run_migrations: true,
        }
    }
}

impl DatabaseSettings {
    pub fn to_db_config(&self) -> clinic_db::DatabaseConfig {
        clinic_db::DatabaseConfig {
            postgres_url: self.postgres_url.clone(),
            pg_max_connections: self.max_connections,
            pg_min_connections: self.min_connections,
            pg_acquire_timeout_secs: self.connect_timeout_secs,
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// JWT signing secret. Required.
    pub jwt_secret: String,

    /// JWT issuer
    pub jwt_issuer: String,

    /// JWT audience
    pub jwt_audience: String,

    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,

    /// Optional password pepper
    pub password_pepper: Option<String>,

    /// Create the default receptionist/doctor accounts when absent
    pub seed_default_users: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        let jwt = clinic_auth::JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_issuer: jwt.issuer,
            jwt_audience: jwt.audience,
            token_lifetime: jwt.token_lifetime,
            password_pepper: None,
            seed_default_users: true,
        }
    }
}

impl AuthSettings {
    pub fn to_auth_config(&self) -> clinic_auth::AuthConfig {
        clinic_auth::AuthConfig {
            jwt: clinic_auth::JwtConfig {
                secret: self.jwt_secret.clone(),
                token_lifetime: self.token_lifetime,
                issuer: self.jwt_issuer.clone(),
                audience: self.jwt_audience.clone(),
            },
            password: clinic_auth::PasswordConfig {
                pepper: self.password_pepper.clone(),
                ..Default::default()
            },
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus exporter
    pub enabled: bool,

    /// Exporter port (separate from main server)
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("CLINIC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()?
            .try_deserialize()
            .context("Invalid server configuration")
    }

    /// Check settings that would make the server unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Err(errors) = self.auth.to_auth_config().validate() {
            anyhow::bail!(
                "Invalid auth configuration: {}. Set JWT_SECRET or CLINIC__AUTH__JWT_SECRET.",
                errors.join("; ")
            );
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections exceeds database.max_connections");
        }
        self.server.socket_addr()?;
        Ok(())
    }
}
