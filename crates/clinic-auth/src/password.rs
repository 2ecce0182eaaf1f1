//! Password Service
//!
//! Password hashing using Argon2id (OWASP recommended).
//! Features:
//! - Configurable parameters following OWASP guidelines
//! - Length policy enforced before hashing
//! - Optional pepper for additional security
//! - Decoy verification so unknown usernames cost the same as wrong passwords

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use std::sync::{Arc, OnceLock};
use zeroize::Zeroizing;

use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};

/// Plaintext hashed once to produce the decoy hash
const DECOY_PASSWORD: &str = "clinic-decoy-password";

/// Password service for hashing and verification
#[derive(Clone)]
pub struct PasswordService {
    config: PasswordConfig,
    decoy_hash: Arc<OnceLock<String>>,
}

impl PasswordService {
    /// Create a new password service
    pub fn new(config: PasswordConfig) -> Self {
        Self {
            config,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hash a password using Argon2id. Produces a PHC string with an
    /// embedded random salt, so equal inputs give different outputs.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.validate_password(password)?;
        self.hash_unchecked(password)
    }

    fn hash_unchecked(&self, password: &str) -> AuthResult<String> {
        let password_with_pepper = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            Some(self.config.hash_length as usize),
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password_with_pepper.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashingFailed)?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails: a malformed or foreign hash simply does not match.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        let password_with_pepper = self.peppered(password);

        // Cost parameters come from the PHC string
        Argon2::default()
            .verify_password(password_with_pepper.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn one verification against a fixed hash. Always returns `false`.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let hash = self.decoy_hash.get_or_init(|| {
            self.hash_unchecked(DECOY_PASSWORD).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build decoy password hash");
                String::new()
            })
        });
        std::hint::black_box(self.verify_password(password, hash));
        false
    }

    /// Validate password against the length policy
    pub fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        if password.len() > self.config.max_password_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at most {} characters",
                self.config.max_password_length
            )));
        }

        Ok(())
    }

    fn peppered(&self, password: &str) -> Zeroizing<String> {
        match &self.config.pepper {
            Some(pepper) => Zeroizing::new(format!("{}{}", password, pepper)),
            None => Zeroizing::new(password.to_string()),
        }
    }
}
