//! Clinic Types - Canonical domain types for the clinic backend
//!
//! This crate contains the foundational types shared by every other clinic
//! crate, with zero dependencies on them:
//!
//! - Staff roles and role sets used by the access control gate
//! - Staff identities resolved from credentials or tokens
//! - Patient records and their role-specific update payloads
//!
//! # Roles
//!
//! ```text
//! receptionist ── demographics (create / update / delete patients)
//! doctor       ── clinical fields (doctor_notes, status)
//! both         ── read access to every patient record
//! ```

pub mod error;
pub mod identity;
pub mod patient;
pub mod role;

pub use error::*;
pub use identity::*;
pub use patient::*;
pub use role::*;
