//! Patient record DTOs
//!
//! Write payloads deny unknown fields, so a receptionist update carrying
//! `doctor_notes` (or a doctor update carrying demographics) is rejected
//! before it reaches a handler.

use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::{ClinicalUpdate, NewPatient, Patient, PatientDetailsUpdate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ApiError, ApiResult};

/// Accepted date-of-birth format
const DOB_FORMAT: &str = "%Y-%m-%d";

/// Reject a date of birth that is not a real `YYYY-MM-DD` date
pub fn check_dob(dob: Option<&str>) -> ApiResult<()> {
    match dob {
        Some(value) if NaiveDate::parse_from_str(value, DOB_FORMAT).is_err() => Err(
            ApiError::ValidationError("dob must be a date in YYYY-MM-DD format".to_string()),
        ),
        _ => Ok(()),
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Admit a new patient (receptionist)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePatientRequest {
    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,
    /// Date of birth, `YYYY-MM-DD`
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Phone or email; unique across patients
    #[validate(length(min = 1, max = 255, message = "contact is required"))]
    pub contact: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(req: CreatePatientRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            dob: req.dob,
            gender: req.gender,
            contact: req.contact,
            address: req.address,
        }
    }
}

/// Update patient demographics (receptionist). Omitted fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePatientRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "first_name cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "last_name cannot be empty"))]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "contact cannot be empty"))]
    pub contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<UpdatePatientRequest> for PatientDetailsUpdate {
    fn from(req: UpdatePatientRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            dob: req.dob,
            gender: req.gender,
            contact: req.contact,
            address: req.address,
        }
    }
}

/// Update clinical fields (doctor)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DoctorNotesRequest {
    #[serde(default)]
    pub doctor_notes: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "status cannot be empty"))]
    pub status: Option<String>,
}

impl From<DoctorNotesRequest> for ClinicalUpdate {
    fn from(req: DoctorNotesRequest) -> Self {
        Self {
            doctor_notes: req.doctor_notes,
            status: req.status,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Patient record as returned to staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientResponse {
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

impl From<Patient> for PatientResponse {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            dob: p.dob,
            gender: p.gender,
            contact: p.contact,
            address: p.address,
            doctor_notes: p.doctor_notes,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Single patient envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientEnvelope {
    pub patient: PatientResponse,
}

/// Patient list envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientListResponse {
    pub patients: Vec<PatientResponse>,
}

/// Write acknowledgement, with the record when one survives the write
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientWriteResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientResponse>,
}

impl PatientWriteResponse {
    pub fn new(message: impl Into<String>, patient: Option<Patient>) -> Self {
        Self {
            message: message.into(),
            patient: patient.map(PatientResponse::from),
        }
    }
}
