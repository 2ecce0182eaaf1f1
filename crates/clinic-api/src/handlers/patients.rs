//! Patient Record Handlers
//!
//! Reads are open to any authenticated staff member. Demographic writes sit
//! under `/api/receptionist`, clinical writes under `/api/doctor`; the role
//! gate is applied by the router.

use axum::{extract::State, http::StatusCode, Json};
use clinic_types::{ClinicalUpdate, NewPatient, PatientDetailsUpdate};
use std::sync::Arc;

use crate::dto::{
    check_dob, CreatePatientRequest, DoctorNotesRequest, PatientEnvelope, PatientListResponse,
    PatientResponse, PatientWriteResponse, UpdatePatientRequest,
};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::{PatientId, RequireAuth, ValidatedJson};
use crate::state::AppState;

fn patient_not_found() -> ApiError {
    ApiError::NotFound("Patient not found".to_string())
}

/// List all patients
#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    responses(
        (status = 200, description = "All live patient records", body = PatientListResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PatientListResponse>> {
    let patients = state.patients.list().await?;

    Ok(Json(PatientListResponse {
        patients: patients.into_iter().map(PatientResponse::from).collect(),
    }))
}

/// Get a patient by id
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "Patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient record", body = PatientEnvelope),
        (status = 400, description = "Invalid patient ID", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    PatientId(id): PatientId,
) -> ApiResult<Json<PatientEnvelope>> {
    let patient = state
        .patients
        .find_by_id(id)
        .await?
        .ok_or_else(patient_not_found)?;

    Ok(Json(PatientEnvelope {
        patient: patient.into(),
    }))
}

/// Admit a patient
#[utoipa::path(
    post,
    path = "/api/receptionist/patients",
    tag = "Patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = PatientWriteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Receptionists only", body = ErrorResponse),
        (status = 409, description = "Contact already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    ValidatedJson(request): ValidatedJson<CreatePatientRequest>,
) -> ApiResult<(StatusCode, Json<PatientWriteResponse>)> {
    check_dob(request.dob.as_deref())?;
    let new_patient = NewPatient::from(request);
    new_patient.validate()?;

    let patient = state.patients.create(&new_patient).await?;

    tracing::info!(
        patient_id = patient.id,
        staff = %caller.username,
        "Patient created"
    );

    Ok((
        StatusCode::CREATED,
        Json(PatientWriteResponse::new(
            "Patient created successfully",
            Some(patient),
        )),
    ))
}

/// Update patient demographics
#[utoipa::path(
    put,
    path = "/api/receptionist/patients/{id}",
    tag = "Patients",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientWriteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Receptionists only", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 409, description = "Contact already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    PatientId(id): PatientId,
    ValidatedJson(request): ValidatedJson<UpdatePatientRequest>,
) -> ApiResult<Json<PatientWriteResponse>> {
    check_dob(request.dob.as_deref())?;
    let update = PatientDetailsUpdate::from(request);
    update.validate()?;

    let patient = state
        .patients
        .update_details(id, &update)
        .await?
        .ok_or_else(patient_not_found)?;

    tracing::info!(patient_id = id, staff = %caller.username, "Patient details updated");

    Ok(Json(PatientWriteResponse::new(
        "Patient updated successfully",
        Some(patient),
    )))
}

/// Soft-delete a patient
#[utoipa::path(
    delete,
    path = "/api/receptionist/patients/{id}",
    tag = "Patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deleted", body = PatientWriteResponse),
        (status = 400, description = "Invalid patient ID", body = ErrorResponse),
        (status = 403, description = "Receptionists only", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    PatientId(id): PatientId,
) -> ApiResult<Json<PatientWriteResponse>> {
    if !state.patients.soft_delete(id).await? {
        return Err(patient_not_found());
    }

    tracing::info!(patient_id = id, staff = %caller.username, "Patient deleted");

    Ok(Json(PatientWriteResponse::new(
        "Patient deleted successfully",
        None,
    )))
}

/// Update doctor notes and/or status
#[utoipa::path(
    put,
    path = "/api/doctor/patients/{id}/notes",
    tag = "Patients",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = DoctorNotesRequest,
    responses(
        (status = 200, description = "Clinical fields updated", body = PatientWriteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Doctors only", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_doctor_notes(
    State(state): State<Arc<AppState>>,
    RequireAuth(caller): RequireAuth,
    PatientId(id): PatientId,
    ValidatedJson(request): ValidatedJson<DoctorNotesRequest>,
) -> ApiResult<Json<PatientWriteResponse>> {
    let update = ClinicalUpdate::from(request);
    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "Either doctor_notes or status is required".to_string(),
        ));
    }

    let patient = state
        .patients
        .update_clinical(id, &update)
        .await?
        .ok_or_else(patient_not_found)?;

    tracing::info!(patient_id = id, doctor = %caller.username, "Clinical notes updated");

    Ok(Json(PatientWriteResponse::new(
        "Doctor notes and status updated successfully",
        Some(patient),
    )))
}
