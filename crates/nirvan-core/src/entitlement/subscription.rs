//! Subscription provider contract.
//!
//! The store SDK itself lives outside this workspace; the application only
//! needs a yes/no entitlement check and a purchase flow.

/// Entitlement identifier that grants unlimited messages.
pub const ENTITLEMENT_ID: &str = "premium";

/// Result of presenting the upgrade flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    Cancelled,
    Failed(String),
}

impl PurchaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased)
    }
}

#[async_trait::async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Whether the `premium` entitlement is active. Failures read as `false`.
    async fn has_active_entitlement(&self) -> bool;

    /// Presents the purchase flow and reports how it ended.
    async fn purchase(&self) -> PurchaseOutcome;

    /// Restores earlier purchases.
    async fn restore(&self) -> PurchaseOutcome;
}
