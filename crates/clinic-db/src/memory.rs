//! In-memory store for tests and local runs without Postgres

use async_trait::async_trait;
use chrono::Utc;
use clinic_types::{
    ClinicalUpdate, Identity, NewPatient, Patient, PatientDetailsUpdate, Role,
    DEFAULT_PATIENT_STATUS,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::DUPLICATE_CONTACT_MESSAGE;
use crate::{DbError, DbResult, PatientStore, UserRecord, UserStore};

#[derive(Default)]
struct PatientTable {
    next_id: i64,
    /// Live and soft-deleted rows; the flag marks deletion
    rows: BTreeMap<i64, (Patient, bool)>,
}

impl PatientTable {
    fn contact_taken(&self, contact: &str, except: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|(id, (p, deleted))| !deleted && p.contact == contact && Some(*id) != except)
    }

    fn live_mut(&mut self, id: i64) -> Option<&mut Patient> {
        match self.rows.get_mut(&id) {
            Some((patient, false)) => Some(patient),
            _ => None,
        }
    }
}

/// Memory-backed [`UserStore`] and [`PatientStore`] with the same
/// uniqueness and soft-delete rules as the Postgres schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    patients: Arc<RwLock<PatientTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str, role: Role) -> DbResult<Identity> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DbError::Duplicate(format!(
                "Username {} already exists",
                username
            )));
        }

        let identity = Identity::new(username, role);
        users.insert(
            username.to_string(),
            UserRecord {
                identity: identity.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(identity)
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn create(&self, patient: &NewPatient) -> DbResult<Patient> {
        let mut table = self.patients.write().await;
        if table.contact_taken(&patient.contact, None) {
            return Err(DbError::Duplicate(DUPLICATE_CONTACT_MESSAGE.to_string()));
        }

        table.next_id += 1;
        let now = Utc::now();
        let record = Patient {
            id: table.next_id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            dob: patient.dob.clone(),
            gender: patient.gender.clone(),
            contact: patient.contact.clone(),
            address: patient.address.clone(),
            doctor_notes: None,
            status: DEFAULT_PATIENT_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(record.id, (record.clone(), false));
        Ok(record)
    }

    async fn list(&self) -> DbResult<Vec<Patient>> {
        let table = self.patients.read().await;
        Ok(table
            .rows
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(p, _)| p.clone())
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Patient>> {
        let table = self.patients.read().await;
        Ok(match table.rows.get(&id) {
            Some((patient, false)) => Some(patient.clone()),
            _ => None,
        })
    }

    async fn update_details(
        &self,
        id: i64,
        update: &PatientDetailsUpdate,
    ) -> DbResult<Option<Patient>> {
        let mut table = self.patients.write().await;
        if table.live_mut(id).is_none() {
            return Ok(None);
        }
        if let Some(contact) = &update.contact {
            if table.contact_taken(contact, Some(id)) {
                return Err(DbError::Duplicate(DUPLICATE_CONTACT_MESSAGE.to_string()));
            }
        }

        Ok(table.live_mut(id).map(|patient| {
            update.apply_to(patient);
            patient.updated_at = Utc::now();
            patient.clone()
        }))
    }

    async fn update_clinical(
        &self,
        id: i64,
        update: &ClinicalUpdate,
    ) -> DbResult<Option<Patient>> {
        let mut table = self.patients.write().await;
        Ok(table.live_mut(id).map(|patient| {
            update.apply_to(patient);
            patient.updated_at = Utc::now();
            patient.clone()
        }))
    }

    async fn soft_delete(&self, id: i64) -> DbResult<bool> {
        let mut table = self.patients.write().await;
        match table.rows.get_mut(&id) {
            Some((_, deleted)) if !*deleted => {
                *deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
