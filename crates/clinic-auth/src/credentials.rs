//! Credential Service
//!
//! Resolves username/password pairs to identities and registers new staff
//! accounts. Argon2 work runs on the blocking pool.
//!
//! Unknown usernames and wrong passwords fail identically, and both paths
//! perform exactly one password verification.

use clinic_db::UserStore;
use clinic_types::{Identity, Role};
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::{AuthError, AuthResult};
use crate::password::PasswordService;

/// Credential verification and account registration
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    password: PasswordService,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserStore>, password: PasswordService) -> Self {
        Self { users, password }
    }

    /// Verify a username/password pair.
    ///
    /// Returns the stored identity unchanged on success and
    /// [`AuthError::InvalidCredentials`] for every kind of mismatch.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<Identity> {
        let record = self.users.find_by_username(username).await?;

        let plaintext = Zeroizing::new(password.to_string());
        let hasher = self.password.clone();

        let Some(record) = record else {
            run_blocking(move || hasher.verify_decoy(&plaintext)).await?;
            warn!(username = %username, "Login failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = record.password_hash;
        let matches =
            run_blocking(move || hasher.verify_password(&plaintext, &stored_hash)).await?;

        if !matches {
            warn!(username = %username, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(username = %username, role = %record.identity.role, "Login succeeded");
        Ok(record.identity)
    }

    /// Register a new staff account with an immutable role
    pub async fn register(&self, username: &str, password: &str, role: Role) -> AuthResult<Identity> {
        if username.is_empty() {
            return Err(AuthError::InvalidInput("Username is required".to_string()));
        }
        self.password.validate_password(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let plaintext = Zeroizing::new(password.to_string());
        let hasher = self.password.clone();
        let password_hash = run_blocking(move || hasher.hash_password(&plaintext)).await??;

        // A concurrent registration can still win the unique constraint;
        // DbError::Duplicate converts to AlreadyExists.
        let identity = self.users.create(username, &password_hash, role).await?;

        info!(username = %identity.username, role = %identity.role, "Registered staff account");
        Ok(identity)
    }

    /// Create the account unless the username is already taken.
    /// Returns `true` when an account was created.
    pub async fn ensure_user(&self, username: &str, password: &str, role: Role) -> AuthResult<bool> {
        match self.register(username, password, role).await {
            Ok(_) => Ok(true),
            Err(AuthError::AlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

async fn run_blocking<T, F>(f: F) -> AuthResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(format!("Password task failed: {}", e)))
}
