//! Staff roles
//!
//! Roles form a closed set. Every place that branches on a role matches
//! exhaustively, so adding a role is a compile error until each gate decides
//! what the new role may do.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Staff role assigned at registration. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Front desk staff: manages patient demographics
    Receptionist,
    /// Clinician: manages clinical notes and status
    Doctor,
}

impl Role {
    /// All known roles
    pub const ALL: [Role; 2] = [Role::Receptionist, Role::Doctor];

    /// Wire / storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receptionist => "receptionist",
            Self::Doctor => "doctor",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Receptionist => 0b01,
            Self::Doctor => 0b10,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receptionist" => Ok(Self::Receptionist),
            "doctor" => Ok(Self::Doctor),
            other => Err(DomainError::InvalidRole {
                value: other.to_string(),
            }),
        }
    }
}

/// Set of roles allowed through a restricted route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Empty set (admits nobody)
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set containing every role
    pub fn all() -> Self {
        Self::from_roles(&Role::ALL)
    }

    /// Set containing exactly one role
    pub fn only(role: Role) -> Self {
        Self(role.bit())
    }

    /// Build a set from a slice of roles
    pub fn from_roles(roles: &[Role]) -> Self {
        Self(roles.iter().fold(0, |acc, r| acc | r.bit()))
    }

    /// Add a role to the set
    pub fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate over the roles in this set
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self::only(role)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|r| r.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!("receptionist".parse::<Role>().unwrap(), Role::Receptionist);
        assert_eq!(Role::Doctor.to_string(), "doctor");

        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid role. Must be 'receptionist' or 'doctor'"
        );
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("Doctor".parse::<Role>().is_err());
        assert!(" doctor".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&Role::Receptionist).unwrap();
        assert_eq!(json, "\"receptionist\"");

        let role: Role = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, Role::Doctor);
        assert!(serde_json::from_str::<Role>("\"nurse\"").is_err());
    }

    #[test]
    fn test_role_set_membership() {
        let set = RoleSet::only(Role::Receptionist);
        assert!(set.contains(Role::Receptionist));
        assert!(!set.contains(Role::Doctor));

        let both = set.with(Role::Doctor);
        assert_eq!(both, RoleSet::all());
        assert_eq!(both.to_string(), "[receptionist, doctor]");

        assert!(RoleSet::empty().is_empty());
        assert!(!RoleSet::empty().contains(Role::Doctor));
    }
}
