//! Patient record types
//!
//! A patient row is split into two write surfaces: demographic details owned
//! by receptionists and clinical fields owned by doctors. The update payloads
//! below mirror that split so neither role can reach the other's fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Status assigned to newly admitted patients
pub const DEFAULT_PATIENT_STATUS: &str = "active";

/// A stored patient record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: Option<String>,
    pub gender: Option<String>,
    /// Phone or email; unique across live patients
    pub contact: String,
    pub address: Option<String>,
    pub doctor_notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Demographics captured when a receptionist admits a patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact: String,
    pub address: Option<String>,
}

impl NewPatient {
    /// Check required fields are present
    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "first_name" });
        }
        if self.last_name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "last_name" });
        }
        if self.contact.trim().is_empty() {
            return Err(DomainError::MissingField { field: "contact" });
        }
        Ok(())
    }
}

/// Partial demographic update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetailsUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
}

impl PatientDetailsUpdate {
    /// Required fields may be omitted but not blanked
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("contact", &self.contact),
        ];
        for (field, value) in required {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(DomainError::MissingField { field });
            }
        }
        Ok(())
    }

    /// Apply the provided fields onto a record
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(v) = &self.first_name {
            patient.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            patient.last_name = v.clone();
        }
        if let Some(v) = &self.dob {
            patient.dob = Some(v.clone());
        }
        if let Some(v) = &self.gender {
            patient.gender = Some(v.clone());
        }
        if let Some(v) = &self.contact {
            patient.contact = v.clone();
        }
        if let Some(v) = &self.address {
            patient.address = Some(v.clone());
        }
    }
}

/// Clinical update written by doctors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalUpdate {
    pub doctor_notes: Option<String>,
    pub status: Option<String>,
}

impl ClinicalUpdate {
    pub fn is_empty(&self) -> bool {
        self.doctor_notes.is_none() && self.status.is_none()
    }

    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(notes) = &self.doctor_notes {
            patient.doctor_notes = Some(notes.clone());
        }
        if let Some(status) = &self.status {
            patient.status = status.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient() -> Patient {
        let now = Utc::now();
        Patient {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            dob: None,
            gender: None,
            contact: "555-0100".to_string(),
            address: None,
            doctor_notes: None,
            status: DEFAULT_PATIENT_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_new_patient_requires_names_and_contact() {
        let mut new = NewPatient {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            contact: "555-0100".to_string(),
            ..Default::default()
        };
        assert!(new.validate().is_ok());

        new.contact = "  ".to_string();
        assert_eq!(
            new.validate(),
            Err(DomainError::MissingField { field: "contact" })
        );
    }

    #[test]
    fn test_details_update_rejects_blanked_required_field() {
        let update = PatientDetailsUpdate {
            last_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            update.validate(),
            Err(DomainError::MissingField { field: "last_name" })
        );
        assert!(PatientDetailsUpdate::default().validate().is_ok());
    }

    #[test]
    fn test_details_update_only_touches_provided_fields() {
        let mut patient = sample_patient();
        let update = PatientDetailsUpdate {
            address: Some("1 Analytical Way".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut patient);

        assert_eq!(patient.address.as_deref(), Some("1 Analytical Way"));
        assert_eq!(patient.first_name, "Ada");
        assert_eq!(patient.contact, "555-0100");
    }

    #[test]
    fn test_clinical_update() {
        assert!(ClinicalUpdate::default().is_empty());

        let mut patient = sample_patient();
        let update = ClinicalUpdate {
            doctor_notes: None,
            status: Some("discharged".to_string()),
        };
        assert!(!update.is_empty());
        update.apply_to(&mut patient);

        assert_eq!(patient.status, "discharged");
        assert!(patient.doctor_notes.is_none());
    }
}
