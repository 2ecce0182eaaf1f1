//! Clinic Authentication Layer
//!
//! Authentication and authorization for clinic staff:
//!
//! - **Password Security**: Argon2id hashing (OWASP recommended)
//! - **Credentials**: login and registration against the user directory
//! - **JWT Authentication**: stateless HS256 access tokens, 24h lifetime
//! - **Access Control**: tower layers gating routes by token and role
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Authentication Flow                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  POST /api/login                                            │
//! │     → CredentialService ── UserStore + PasswordService      │
//! │     → JwtService::issue                                     │
//! │                                                             │
//! │  Protected request                                          │
//! │     → AuthLayer (Bearer token → JwtService::validate)       │
//! │     → RoleLayer (AuthContext.role ∈ RoleSet)                │
//! │     → Handler                                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod types;

pub use config::{AuthConfig, JwtConfig, PasswordConfig};
pub use credentials::CredentialService;
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::JwtService;
pub use middleware::{AuthLayer, AuthMiddleware, RequireAuth, RoleGuard, RoleLayer};
pub use password::PasswordService;
pub use types::*;

use clinic_db::UserStore;
use std::sync::Arc;

/// Main authentication service combining credential checks and tokens
#[derive(Clone)]
pub struct AuthService {
    pub jwt: Arc<JwtService>,
    pub password: PasswordService,
    pub credentials: CredentialService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service. Fails when the signing secret is missing.
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> AuthResult<Self> {
        let jwt = Arc::new(JwtService::new(config.jwt.clone())?);
        let password = PasswordService::new(config.password.clone());
        let credentials = CredentialService::new(users, password.clone());

        Ok(Self {
            jwt,
            password,
            credentials,
            config,
        })
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify credentials and mint an access token
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<LoginGrant> {
        let identity = self.credentials.login(username, password).await?;
        let token = self.jwt.issue_now(&identity.username, identity.role)?;
        Ok(LoginGrant { identity, token })
    }

    /// Create an auth layer for Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.jwt.clone())
    }
}
