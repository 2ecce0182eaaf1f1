//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use clinic_types::{Identity, Patient, Role};
use sqlx::FromRow;

use crate::error::{DbError, DbResult};

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A staff account as the credential layer sees it: identity plus the
/// stored hash to verify against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub identity: Identity,
    pub password_hash: String,
}

impl TryFrom<DbUser> for UserRecord {
    type Error = DbError;

    fn try_from(row: DbUser) -> DbResult<Self> {
        let role: Role = row.role.parse().map_err(|_| {
            DbError::CorruptRow(format!("user {} has unknown role {:?}", row.id, row.role))
        })?;
        Ok(Self {
            identity: Identity::new(row.username, role),
            password_hash: row.password_hash,
        })
    }
}

// ============================================================================
// Patient Models
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DbPatient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact: String,
    pub address: Option<String>,
    pub doctor_notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbPatient> for Patient {
    fn from(row: DbPatient) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            dob: row.dob,
            gender: row.gender,
            contact: row.contact,
            address: row.address,
            doctor_notes: row.doctor_notes,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
