//! Authentication configuration
//!
//! Centralized configuration for the credential and token components with
//! secure defaults following OWASP recommendations.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
}

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens. Empty means unavailable.
    pub secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set
            token_lifetime: Duration::from_secs(24 * 60 * 60), // 24 hours
            issuer: "clinic".to_string(),
            audience: "clinic-api".to_string(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB (OWASP recommends 19456 KiB = 19 MiB minimum)
    pub memory_cost: u32,
    /// Time cost (iterations) - OWASP recommends 2 minimum
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Pepper (additional secret, optional)
    pub pepper: Option<String>,
    /// Minimum password length in characters
    pub min_password_length: usize,
    /// Maximum password length in bytes (to prevent DoS)
    pub max_password_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            // OWASP recommended values for Argon2id
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
            min_password_length: 1,
            max_password_length: 128,
        }
    }
}

impl AuthConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.jwt.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("JWT_AUDIENCE") {
            config.jwt.audience = audience;
        }
        if let Ok(pepper) = std::env::var("PASSWORD_PEPPER") {
            config.password.pepper = Some(pepper);
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.jwt.secret.is_empty() {
            errors.push("JWT secret must be set".to_string());
        }
        if self.jwt.token_lifetime.is_zero() {
            errors.push("Token lifetime must be greater than zero".to_string());
        }
        if self.password.min_password_length == 0 {
            errors.push("Minimum password length must be at least 1".to_string());
        }
        if self.password.max_password_length < self.password.min_password_length {
            errors.push("Maximum password length is below the minimum".to_string());
        }
        if argon2::Params::new(
            self.password.memory_cost,
            self.password.time_cost,
            self.password.parallelism,
            Some(self.password.hash_length as usize),
        )
        .is_err()
        {
            errors.push("Argon2 parameters are out of range".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt.token_lifetime, Duration::from_secs(86_400));
        assert_eq!(config.password.memory_cost, 19456);
        assert_eq!(config.jwt.issuer, "clinic");
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = AuthConfig::default();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors, vec!["JWT secret must be set".to_string()]);
    }

    #[test]
    fn test_config_validation_valid() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "dev-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_argon2_params() {
        let mut config = AuthConfig::default();
        config.jwt.secret = "dev-secret".to_string();
        config.password.time_cost = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetime_deserializes_from_humantime() {
        let json = r#"{"secret":"s","token_lifetime":"12h"}"#;
        let jwt: JwtConfig = serde_json::from_str(json).unwrap();
        assert_eq!(jwt.token_lifetime, Duration::from_secs(12 * 3600));
        assert_eq!(jwt.audience, "clinic-api");
    }
}
