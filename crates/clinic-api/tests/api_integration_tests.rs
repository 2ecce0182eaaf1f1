//! API Integration Tests
//!
//! Drives the full router against the in-memory store and a cheap Argon2
//! configuration, covering the request/response cycle end to end.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use clinic_api::{create_router, create_test_router, ApiConfig, AppState};
use clinic_auth::{AuthConfig, AuthService};
use clinic_db::MemoryStore;
use clinic_types::Role;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.jwt.secret = "integration-test-secret".to_string();
    config.password.memory_cost = 4096;
    config.password.time_cost = 1;
    config
}

fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let auth = AuthService::new(store.clone(), test_auth_config()).unwrap();
    let state = Arc::new(AppState::new(Arc::new(auth), store));
    TestApp {
        router: create_test_router(state.clone()),
        state,
    }
}

/// Make a request and get the JSON response
async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));

    (status, json)
}

async fn register(router: &Router, username: &str, password: &str, role: &str) -> StatusCode {
    let (status, _) = json_request(
        router,
        "POST",
        "/api/register",
        None,
        Some(json!({"username": username, "password": password, "role": role})),
    )
    .await;
    status
}

async fn login_token(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// A receptionist and a doctor, logged in
async fn staffed_app() -> (TestApp, String, String) {
    let app = test_app();
    assert_eq!(
        register(&app.router, "frontdesk", "desk-pass", "receptionist").await,
        StatusCode::CREATED
    );
    assert_eq!(
        register(&app.router, "drhouse", "house-pass", "doctor").await,
        StatusCode::CREATED
    );
    let receptionist = login_token(&app.router, "frontdesk", "desk-pass").await;
    let doctor = login_token(&app.router, "drhouse", "house-pass").await;
    (app, receptionist, doctor)
}

async fn create_patient(router: &Router, token: &str, contact: &str) -> i64 {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/receptionist/patients",
        Some(token),
        Some(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "dob": "1815-12-10",
            "gender": "female",
            "contact": contact,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["patient"]["id"].as_i64().unwrap()
}

// =============================================================================
// Authentication Scenario
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_register_login_and_role_gate_scenario() {
        let app = test_app();

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "alice", "password": "pw1", "role": "doctor"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "doctor");

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "alice", "password": "pw2", "role": "receptionist"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["role"], "doctor");
        let alice_token = body["token"].as_str().unwrap().to_string();

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");

        let new_patient = json!({"first_name": "Bob", "last_name": "Stone", "contact": "555-0199"});

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/receptionist/patients",
            Some(&alice_token),
            Some(new_patient.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: Insufficient role permissions");

        assert_eq!(
            register(&app.router, "rita", "pw3", "receptionist").await,
            StatusCode::CREATED
        );
        let rita_token = login_token(&app.router, "rita", "pw3").await;

        let (status, _) = json_request(
            &app.router,
            "POST",
            "/api/receptionist/patients",
            Some(&rita_token),
            Some(new_patient),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let app = test_app();
        register(&app.router, "alice", "pw1", "doctor").await;

        let wrong_password = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "nope"})),
        )
        .await;
        let unknown_user = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "mallory", "password": "nope"})),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_role() {
        let app = test_app();
        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "nina", "password": "pw", "role": "nurse"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid role. Must be 'receptionist' or 'doctor'");

        let (status, _) = json_request(
            &app.router,
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "nina", "password": "pw", "role": "Doctor"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let app = test_app();
        let (status, _) = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_me_returns_token_identity() {
        let (app, receptionist, _) = staffed_app().await;
        let (status, body) =
            json_request(&app.router, "GET", "/api/me", Some(&receptionist), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"username": "frontdesk", "role": "receptionist"}));
    }
}

// =============================================================================
// Token Gate
// =============================================================================

mod token_gate {
    use super::*;

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let app = test_app();
        let (status, body) = json_request(&app.router, "GET", "/api/patients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header required");
    }

    #[tokio::test]
    async fn test_malformed_authorization_headers() {
        let app = test_app();
        for value in ["Token abc", "Bearer", "bearer abc", "Bearer a b"] {
            let request = Request::builder()
                .uri("/api/patients")
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap();
            let response = app.router.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "header {:?} should be rejected",
                value
            );
        }
    }

    #[tokio::test]
    async fn test_token_failures_share_generic_message() {
        let app = test_app();

        let expired = app
            .state
            .auth
            .jwt
            .issue("alice", Role::Doctor, Utc::now() - Duration::hours(25))
            .unwrap()
            .token;

        let foreign_secret = {
            let mut config = test_auth_config();
            config.jwt.secret = "some-other-secret".to_string();
            AuthService::new(Arc::new(MemoryStore::new()), config)
                .unwrap()
                .jwt
                .issue_now("alice", Role::Doctor)
                .unwrap()
                .token
        };

        for token in [expired.as_str(), foreign_secret.as_str(), "garbage"] {
            let (status, body) =
                json_request(&app.router, "GET", "/api/patients", Some(token), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "Invalid or expired token");
        }
    }

    #[tokio::test]
    async fn test_auth_error_codes_from_gate_and_handlers() {
        let (app, _, doctor) = staffed_app().await;

        // Gate rejections
        let (status, body) = json_request(&app.router, "GET", "/api/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHENTICATED");

        let (status, body) =
            json_request(&app.router, "GET", "/api/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");

        let (status, body) = json_request(
            &app.router,
            "GET",
            "/api/receptionist/patients",
            Some(&doctor),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        // Handler rejections use the same vocabulary
        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "drhouse", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid credentials", "code": "INVALID_CREDENTIALS"}));

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/register",
            None,
            Some(json!({"username": "drhouse", "password": "pw", "role": "doctor"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_token_valid_without_user_lookup() {
        // Tokens are trusted until expiry; the directory is not consulted
        let app = test_app();
        let token = app.state.auth.jwt.issue_now("ghost", Role::Doctor).unwrap().token;
        let (status, body) = json_request(&app.router, "GET", "/api/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ghost");
    }
}

// =============================================================================
// Patient Records
// =============================================================================

mod patients {
    use super::*;

    #[tokio::test]
    async fn test_both_roles_can_read() {
        let (app, receptionist, doctor) = staffed_app().await;
        let id = create_patient(&app.router, &receptionist, "555-0100").await;

        for token in [&receptionist, &doctor] {
            let (status, body) =
                json_request(&app.router, "GET", "/api/patients", Some(token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["patients"].as_array().unwrap().len(), 1);

            let uri = format!("/api/patients/{}", id);
            let (status, body) = json_request(&app.router, "GET", &uri, Some(token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["patient"]["first_name"], "Ada");
            assert_eq!(body["patient"]["status"], "active");
        }
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_patient_ids() {
        let (app, receptionist, _) = staffed_app().await;

        let (status, body) =
            json_request(&app.router, "GET", "/api/patients/abc", Some(&receptionist), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid patient ID");

        let (status, body) =
            json_request(&app.router, "GET", "/api/patients/999", Some(&receptionist), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Patient not found");
    }

    #[tokio::test]
    async fn test_duplicate_contact_conflicts() {
        let (app, receptionist, _) = staffed_app().await;
        create_patient(&app.router, &receptionist, "555-0100").await;

        let (status, body) = json_request(
            &app.router,
            "POST",
            "/api/receptionist/patients",
            Some(&receptionist),
            Some(json!({"first_name": "Eve", "last_name": "Adams", "contact": "555-0100"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Patient with this contact already exists");
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_create_rejects_bad_dob() {
        let (app, receptionist, _) = staffed_app().await;
        let (status, _) = json_request(
            &app.router,
            "POST",
            "/api/receptionist/patients",
            Some(&receptionist),
            Some(json!({
                "first_name": "Eve",
                "last_name": "Adams",
                "contact": "555-0111",
                "dob": "yesterday"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_receptionist_updates_demographics_only() {
        let (app, receptionist, _) = staffed_app().await;
        let id = create_patient(&app.router, &receptionist, "555-0100").await;
        let uri = format!("/api/receptionist/patients/{}", id);

        let (status, body) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&receptionist),
            Some(json!({"address": "12 Analytical Row"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Patient updated successfully");
        assert_eq!(body["patient"]["address"], "12 Analytical Row");
        assert_eq!(body["patient"]["first_name"], "Ada");

        let (status, _) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&receptionist),
            Some(json!({"doctor_notes": "sneaky"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_doctor_cannot_use_receptionist_routes() {
        let (app, receptionist, doctor) = staffed_app().await;
        let id = create_patient(&app.router, &receptionist, "555-0100").await;
        let uri = format!("/api/receptionist/patients/{}", id);

        let (status, _) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&doctor),
            Some(json!({"address": "elsewhere"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = json_request(&app.router, "DELETE", &uri, Some(&doctor), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_doctor_notes() {
        let (app, receptionist, doctor) = staffed_app().await;
        let id = create_patient(&app.router, &receptionist, "555-0100").await;
        let uri = format!("/api/doctor/patients/{}/notes", id);

        let (status, body) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&doctor),
            Some(json!({"doctor_notes": "Stable, review in two weeks"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Doctor notes and status updated successfully");
        assert_eq!(body["patient"]["doctor_notes"], "Stable, review in two weeks");
        assert_eq!(body["patient"]["status"], "active");

        let (status, body) =
            json_request(&app.router, "PUT", &uri, Some(&doctor), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Either doctor_notes or status is required");

        let (status, _) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&doctor),
            Some(json!({"status": "discharged", "contact": "555-0999"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = json_request(
            &app.router,
            "PUT",
            &uri,
            Some(&receptionist),
            Some(json!({"status": "discharged"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = json_request(
            &app.router,
            "PUT",
            "/api/doctor/patients/404/notes",
            Some(&doctor),
            Some(json!({"status": "discharged"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_soft_deleted_patient_is_invisible() {
        let (app, receptionist, _) = staffed_app().await;
        let id = create_patient(&app.router, &receptionist, "555-0100").await;
        let uri = format!("/api/receptionist/patients/{}", id);

        let (status, body) = json_request(&app.router, "DELETE", &uri, Some(&receptionist), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Patient deleted successfully");

        let (status, _) = json_request(
            &app.router,
            "GET",
            &format!("/api/patients/{}", id),
            Some(&receptionist),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) =
            json_request(&app.router, "GET", "/api/patients", Some(&receptionist), None).await;
        assert!(body["patients"].as_array().unwrap().is_empty());

        let (status, _) = json_request(&app.router, "DELETE", &uri, Some(&receptionist), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Contact is free again once the holder is deleted
        create_patient(&app.router, &receptionist, "555-0100").await;
    }
}

// =============================================================================
// Probes and Middleware
// =============================================================================

mod probes {
    use super::*;

    #[tokio::test]
    async fn test_health_and_ready_without_database() {
        let app = test_app();

        let (status, body) = json_request(&app.router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = json_request(&app.router, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_full_router_sets_request_id() {
        let app = test_app();
        let config = ApiConfig {
            enable_compression: false,
            ..Default::default()
        };
        let router = create_router(app.state.clone(), config);

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
