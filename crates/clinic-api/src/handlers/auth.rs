//! Authentication Handlers
//!
//! Login, registration and the current-caller endpoint.

use axum::{extract::State, http::StatusCode, Json};
use clinic_auth::AuthError;
use clinic_types::Role;
use std::sync::Arc;

use crate::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserInfo};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::{RequireAuth, ValidatedJson};
use crate::state::AppState;

/// Staff login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let grant = match state.auth.login(&request.username, &request.password).await {
        Ok(grant) => grant,
        Err(e) => {
            let outcome = match e {
                AuthError::InvalidCredentials => "invalid_credentials",
                _ => "error",
            };
            metrics::counter!("clinic_logins_total", "outcome" => outcome).increment(1);
            return Err(ApiError::from(e));
        }
    };
    metrics::counter!("clinic_logins_total", "outcome" => "success").increment(1);

    tracing::info!(
        username = %grant.identity.username,
        role = %grant.identity.role,
        "Issued access token"
    );

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: UserInfo::from(&grant.identity),
        token: grant.token.token,
        token_type: grant.token.token_type,
        expires_at: grant.token.expires_at,
    }))
}

/// Register a staff account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid role or password", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let role: Role = request.role.parse()?;

    let identity = state
        .auth
        .credentials
        .register(&request.username, &request.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            username: identity.username,
            role: identity.role.to_string(),
        }),
    ))
}

/// Current caller
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Authenticated staff member", body = UserInfo),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(RequireAuth(context): RequireAuth) -> Json<UserInfo> {
    Json(UserInfo::from(&context.identity()))
}
