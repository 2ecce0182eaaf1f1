//! Patient repository

use async_trait::async_trait;
use clinic_types::{ClinicalUpdate, NewPatient, Patient, PatientDetailsUpdate, DEFAULT_PATIENT_STATUS};
use sqlx::PgPool;

use crate::error::{map_unique_violation, DUPLICATE_CONTACT_MESSAGE};
use crate::{DbPatient, DbResult, PatientStore};

const CONTACT_INDEX: &str = "patients_contact_live_idx";

/// Patient repository backed by the `patients` table
#[derive(Clone)]
pub struct PatientRepo {
    pool: PgPool,
}

impl PatientRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PatientRepo {
    async fn create(&self, patient: &NewPatient) -> DbResult<Patient> {
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            INSERT INTO patients (first_name, last_name, dob, gender, contact, address, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, first_name, last_name, dob, gender, contact, address,
                doctor_notes, status, created_at, updated_at
            "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.dob)
        .bind(&patient.gender)
        .bind(&patient.contact)
        .bind(&patient.address)
        .bind(DEFAULT_PATIENT_STATUS)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, CONTACT_INDEX, || {
                DUPLICATE_CONTACT_MESSAGE.to_string()
            })
        })?;

        Ok(row.into())
    }

    async fn list(&self) -> DbResult<Vec<Patient>> {
        let rows = sqlx::query_as::<_, DbPatient>(
            r#"
            SELECT
                id, first_name, last_name, dob, gender, contact, address,
                doctor_notes, status, created_at, updated_at
            FROM patients
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Patient>> {
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            SELECT
                id, first_name, last_name, dob, gender, contact, address,
                doctor_notes, status, created_at, updated_at
            FROM patients
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Patient::from))
    }

    async fn update_details(
        &self,
        id: i64,
        update: &PatientDetailsUpdate,
    ) -> DbResult<Option<Patient>> {
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            UPDATE patients SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                dob = COALESCE($4, dob),
                gender = COALESCE($5, gender),
                contact = COALESCE($6, contact),
                address = COALESCE($7, address),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING
                id, first_name, last_name, dob, gender, contact, address,
                doctor_notes, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.dob)
        .bind(&update.gender)
        .bind(&update.contact)
        .bind(&update.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, CONTACT_INDEX, || {
                DUPLICATE_CONTACT_MESSAGE.to_string()
            })
        })?;

        Ok(row.map(Patient::from))
    }

    async fn update_clinical(
        &self,
        id: i64,
        update: &ClinicalUpdate,
    ) -> DbResult<Option<Patient>> {
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            UPDATE patients SET
                doctor_notes = COALESCE($2, doctor_notes),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING
                id, first_name, last_name, dob, gender, contact, address,
                doctor_notes, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.doctor_notes)
        .bind(&update.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Patient::from))
    }

    async fn soft_delete(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE patients SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
