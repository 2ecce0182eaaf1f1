//! Application state shared across handlers

use clinic_auth::AuthService;
use clinic_db::{Database, PatientStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authentication service (credentials + tokens)
    pub auth: Arc<AuthService>,
    /// Patient record storage
    pub patients: Arc<dyn PatientStore>,
    /// Postgres handle for readiness checks; absent for in-memory stores
    pub db: Option<Arc<Database>>,
}

impl AppState {
    /// Create a new application state
    pub fn new(auth: Arc<AuthService>, patients: Arc<dyn PatientStore>) -> Self {
        Self {
            auth,
            patients,
            db: None,
        }
    }

    /// Attach the database used by the readiness probe
    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }
}
