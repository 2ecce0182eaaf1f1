//! Clinic Database Layer
//!
//! PostgreSQL persistence for staff accounts and patient records.
//!
//! # Repository Pattern
//!
//! Each table has its own repository implementing a storage trait:
//!
//! - [`UserStore`] / [`UserRepo`]: staff accounts keyed by unique username,
//!   storing only the password hash
//! - [`PatientStore`] / [`PatientRepo`]: patient records with soft delete
//!
//! Consumers hold `Arc<dyn UserStore>` / `Arc<dyn PatientStore>`, so the
//! in-memory [`MemoryStore`] (feature `mock`) can stand in for Postgres.

pub mod config;
pub mod error;
pub mod models;
pub mod repos;
pub mod store;

#[cfg(any(test, feature = "mock"))]
pub mod memory;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;
pub use store::{PatientStore, UserStore};

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check for the connection pool
    pub async fn health_check(&self) -> HealthStatus {
        let postgres = sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok();

        HealthStatus {
            postgres,
            healthy: postgres,
        }
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.pg.clone())
    }

    pub fn patient_repo(&self) -> PatientRepo {
        PatientRepo::new(self.pg.clone())
    }
}

/// Health status of database connections
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub postgres: bool,
    pub healthy: bool,
}
