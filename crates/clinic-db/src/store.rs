//! Storage traits
//!
//! The auth core and HTTP handlers depend on these traits, never on a
//! concrete pool. Postgres repositories implement them for production and
//! [`crate::MemoryStore`] implements them for tests.

use async_trait::async_trait;
use clinic_types::{ClinicalUpdate, Identity, NewPatient, Patient, PatientDetailsUpdate, Role};

use crate::error::DbResult;
use crate::models::UserRecord;

/// Staff account directory
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup. `Ok(None)` when no account has this username.
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRecord>>;

    /// Insert a new account. Fails with `DbError::Duplicate` when the
    /// username is taken.
    async fn create(&self, username: &str, password_hash: &str, role: Role) -> DbResult<Identity>;
}

/// Patient record storage. Soft-deleted rows are invisible to every method.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn create(&self, patient: &NewPatient) -> DbResult<Patient>;

    /// All live patients ordered by id
    async fn list(&self) -> DbResult<Vec<Patient>>;

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Patient>>;

    /// Apply a demographic update. `Ok(None)` when the patient does not exist.
    async fn update_details(
        &self,
        id: i64,
        update: &PatientDetailsUpdate,
    ) -> DbResult<Option<Patient>>;

    /// Apply a clinical update. `Ok(None)` when the patient does not exist.
    async fn update_clinical(&self, id: i64, update: &ClinicalUpdate)
        -> DbResult<Option<Patient>>;

    /// Returns `false` when there was no live patient to delete
    async fn soft_delete(&self, id: i64) -> DbResult<bool>;
}
