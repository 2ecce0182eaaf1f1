//! Staff identity

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A resolved staff member: who they are and what they may do.
///
/// Produced by a successful login or by validating an access token. Never
/// carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }

    pub fn is_receptionist(&self) -> bool {
        self.role == Role::Receptionist
    }
}
