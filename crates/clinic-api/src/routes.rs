//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use clinic_auth::RoleLayer;
use clinic_types::Role;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create `/api` routes
pub fn api_routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        // Public
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        // Requires a valid bearer token
        .merge(protected_routes(state))
}

/// Routes behind the token gate
fn protected_routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/patients", get(handlers::patients::list_patients))
        .route("/patients/:id", get(handlers::patients::get_patient))
        .nest("/receptionist", receptionist_routes())
        .nest("/doctor", doctor_routes())
        .route_layer(state.auth.layer())
}

/// Demographic writes (receptionist only)
fn receptionist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/patients", post(handlers::patients::create_patient))
        .route(
            "/patients/:id",
            put(handlers::patients::update_patient).delete(handlers::patients::delete_patient),
        )
        .route_layer(RoleLayer::new(Role::Receptionist))
}

/// Clinical writes (doctor only)
fn doctor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/patients/:id/notes",
            put(handlers::patients::update_doctor_notes),
        )
        .route_layer(RoleLayer::new(Role::Doctor))
}

/// Swagger UI and OpenAPI document
pub fn swagger_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
