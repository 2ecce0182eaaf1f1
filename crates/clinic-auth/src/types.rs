//! Core authentication types
//!
//! Shared types used across the token, credential and middleware components.

use clinic_types::{Identity, Role};
use serde::{Deserialize, Serialize};

/// Per-request caller context, derived from a validated token.
///
/// Inserted into request extensions by the auth middleware and dropped
/// with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.role)
    }
}

impl From<TokenClaims> for AuthContext {
    fn from(claims: TokenClaims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Staff role
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl TokenClaims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.role)
    }
}

/// A freshly minted access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,
    /// Expiry (Unix timestamp)
    pub expires_at: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

impl IssuedToken {
    pub fn new(token: String, expires_at: i64) -> Self {
        Self {
            token,
            expires_at,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Result of a successful login: who logged in and their token
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub identity: Identity,
    pub token: IssuedToken,
}
