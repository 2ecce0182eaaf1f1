//! Error types for clinic domain values

use thiserror::Error;

/// Result type for domain-level parsing and validation
pub type Result<T> = std::result::Result<T, DomainError>;

/// Domain error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Role string is not one of the known staff roles
    #[error("Invalid role. Must be 'receptionist' or 'doctor'")]
    InvalidRole { value: String },

    /// A required field was empty
    #[error("{field} is required")]
    MissingField { field: &'static str },
}
