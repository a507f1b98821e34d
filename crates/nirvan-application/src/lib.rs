//! Application layer for Nirvan.
//!
//! Use cases that coordinate the domain, the key-value backed store and the
//! completion endpoint on behalf of the app's screens.

pub mod bootstrap;
pub mod chat_usecase;
pub mod coach_catalog;
pub mod entitlement_service;
pub mod logging;

pub use bootstrap::NirvanApp;
pub use chat_usecase::{ChatUseCase, SendOutcome};
pub use coach_catalog::CoachCatalog;
pub use entitlement_service::{EntitlementService, StaticSubscriptionProvider};
pub use logging::init_tracing;
