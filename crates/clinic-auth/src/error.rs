//! Authentication error types
//!
//! Errors are designed to be:
//! - Informative for logging/debugging
//! - Safe for external exposure (no sensitive data leakage)
//! - Convertible to HTTP status codes
//!
//! Every token failure renders the same client message; the precise reason
//! is only visible in logs.

use clinic_db::DbError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Message shown to clients for any token validation failure
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors
    // =========================================================================
    /// Token could not be parsed or is missing required claims
    #[error("Malformed token")]
    Malformed,

    /// Signature does not verify, or the header declares another algorithm
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is used before its not-before time
    #[error("Token is not yet valid")]
    NotYetValid,

    /// Token could not be signed (missing secret or encoder failure)
    #[error("Token signing failed: {0}")]
    SigningError(String),

    // =========================================================================
    // Request Errors
    // =========================================================================
    /// No Authorization header on a protected route
    #[error("Authorization header required")]
    MissingAuthorization,

    /// Authorization header is not `Bearer <token>`
    #[error("Invalid Authorization header format")]
    MalformedAuthorization,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username is already registered
    #[error("Username already exists")]
    AlreadyExists,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Registration input rejected
    #[error("{0}")]
    InvalidInput(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    // =========================================================================
    // Permission Errors
    // =========================================================================
    /// Authenticated caller's role is not allowed on this route
    #[error("Forbidden: Insufficient role permissions")]
    Forbidden,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::WeakPassword(_) | Self::InvalidInput(_) => 400,

            // 401 Unauthorized
            Self::Malformed
            | Self::InvalidSignature
            | Self::Expired
            | Self::NotYetValid
            | Self::MissingAuthorization
            | Self::MalformedAuthorization
            | Self::InvalidCredentials => 401,

            // 403 Forbidden
            Self::Forbidden => 403,

            // 409 Conflict
            Self::AlreadyExists => 409,

            // 500 Internal Server Error
            Self::SigningError(_)
            | Self::PasswordHashingFailed
            | Self::Database(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed | Self::InvalidSignature | Self::Expired | Self::NotYetValid => {
                "INVALID_TOKEN"
            }
            Self::MissingAuthorization | Self::MalformedAuthorization => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Forbidden => "FORBIDDEN",
            Self::SigningError(_)
            | Self::PasswordHashingFailed
            | Self::Database(_)
            | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Short label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::SigningError(_) => "signing_error",
            Self::MissingAuthorization => "missing_authorization",
            Self::MalformedAuthorization => "malformed_authorization",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AlreadyExists => "already_exists",
            Self::WeakPassword(_) => "weak_password",
            Self::InvalidInput(_) => "invalid_input",
            Self::PasswordHashingFailed => "hashing_failed",
            Self::Forbidden => "forbidden",
            Self::Database(_) => "database",
            Self::Internal(_) => "internal",
        }
    }

    /// True for failures of token validation
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::Malformed | Self::InvalidSignature | Self::Expired | Self::NotYetValid
        )
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            _ if self.is_token_error() => INVALID_TOKEN_MESSAGE.to_string(),
            _ if self.is_server_error() => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Error body returned by every endpoint, from the gate and from handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message (human-readable)
    pub error: String,
    /// Error code (machine-readable)
    pub code: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.client_message(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed,
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(_) => Self::AlreadyExists,
            other => Self::Database(other.to_string()),
        }
    }
}
