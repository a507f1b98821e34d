//! Domain models and repository contracts for the Nirvan coach app.

pub mod chat;
pub mod coach;
pub mod config;
pub mod consent;
pub mod entitlement;
pub mod error;
pub mod user;

// Re-export common error type
pub use error::{NirvanError, Result};
