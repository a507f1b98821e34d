//! Entitlement domain module.
//!
//! - `gate`: the per-coach free-message quota policy
//! - `subscription`: the contract of the external subscription provider

mod gate;
mod subscription;

pub use gate::{
    Admission, DEFAULT_FREE_MESSAGE_LIMIT, DebugOverride, EntitlementConfig, EntitlementGate,
    Remaining,
};
pub use subscription::{ENTITLEMENT_ID, PurchaseOutcome, SubscriptionProvider};
