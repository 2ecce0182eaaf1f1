//! Repository implementations

mod patient;
mod user;

pub use patient::PatientRepo;
pub use user::UserRepo;
