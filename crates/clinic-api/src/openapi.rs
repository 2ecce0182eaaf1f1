//! OpenAPI Documentation
//!
//! Generated OpenAPI 3.0 document for the clinic API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// Clinic API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clinic API",
        description = "Staff authentication and patient records for a clinic front desk and its doctors.",
        version = "0.1.0",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Auth
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::me,
        // Patients
        handlers::patients::list_patients,
        handlers::patients::get_patient,
        handlers::patients::create_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,
        handlers::patients::update_doctor_notes,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth
            dto::LoginRequest,
            dto::LoginResponse,
            dto::UserInfo,
            dto::RegisterRequest,
            dto::RegisterResponse,
            // Patients
            dto::CreatePatientRequest,
            dto::UpdatePatientRequest,
            dto::DoctorNotesRequest,
            dto::PatientResponse,
            dto::PatientEnvelope,
            dto::PatientListResponse,
            dto::PatientWriteResponse,
            // Health
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ComponentStatus,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Authentication", description = "Staff login and registration"),
        (name = "Patients", description = "Patient records, gated by staff role")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security scheme modifier
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
