//! Data Transfer Objects
//!
//! Request and response types for the REST API.

pub mod auth;
pub mod patient;

pub use auth::*;
pub use patient::*;
