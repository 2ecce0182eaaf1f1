//! Authentication DTOs

use clinic_types::Identity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// =============================================================================
// Login
// =============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Status message
    pub message: String,
    /// Access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
    /// Logged-in staff member
    pub user: UserInfo,
}

/// Public view of a staff member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub username: String,
    /// `receptionist` or `doctor`
    pub role: String,
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            role: identity.role.to_string(),
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Username (unique)
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    /// Password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// `receptionist` or `doctor`
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub username: String,
    pub role: String,
}
