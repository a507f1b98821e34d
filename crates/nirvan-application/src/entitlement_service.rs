//! Entitlement service.
//!
//! Combines the subscription provider with the free-message gate. The
//! provider's last report is cached; a purchase completed in this process is
//! tracked on its own and lifts the quota until the process exits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nirvan_core::chat::ChatRepository;
use nirvan_core::entitlement::{
    Admission, ENTITLEMENT_ID, EntitlementGate, PurchaseOutcome, Remaining, SubscriptionProvider,
};
use tokio::sync::RwLock;

/// Provider with a fixed answer, for builds without a store SDK.
#[derive(Debug, Clone)]
pub struct StaticSubscriptionProvider {
    active: bool,
    purchase_outcome: PurchaseOutcome,
}

impl StaticSubscriptionProvider {
    /// Never entitled; purchases are cancelled.
    pub fn free() -> Self {
        Self {
            active: false,
            purchase_outcome: PurchaseOutcome::Cancelled,
        }
    }

    pub fn premium() -> Self {
        Self {
            active: true,
            purchase_outcome: PurchaseOutcome::Purchased,
        }
    }

    pub fn with_purchase_outcome(mut self, outcome: PurchaseOutcome) -> Self {
        self.purchase_outcome = outcome;
        self
    }
}

#[async_trait::async_trait]
impl SubscriptionProvider for StaticSubscriptionProvider {
    async fn has_active_entitlement(&self) -> bool {
        self.active
    }

    async fn purchase(&self) -> PurchaseOutcome {
        self.purchase_outcome.clone()
    }

    async fn restore(&self) -> PurchaseOutcome {
        if self.active {
            PurchaseOutcome::Purchased
        } else {
            PurchaseOutcome::Cancelled
        }
    }
}

pub struct EntitlementService {
    provider: Arc<dyn SubscriptionProvider>,
    gate: EntitlementGate,
    /// Last provider report; `None` until the provider has been asked once.
    reported: RwLock<Option<bool>>,
    purchased_here: AtomicBool,
}

impl EntitlementService {
    pub fn new(provider: Arc<dyn SubscriptionProvider>, gate: EntitlementGate) -> Self {
        Self {
            provider,
            gate,
            reported: RwLock::new(None),
            purchased_here: AtomicBool::new(false),
        }
    }

    pub fn gate(&self) -> &EntitlementGate {
        &self.gate
    }

    /// Asks the provider again and replaces the cached report.
    pub async fn refresh(&self) -> bool {
        let reported = self.provider.has_active_entitlement().await;
        *self.reported.write().await = Some(reported);
        tracing::debug!(
            "Entitlement '{}' refreshed: active={}",
            ENTITLEMENT_ID,
            reported
        );
        self.effective(reported)
    }

    /// Unlimited status after the debug override is applied.
    pub async fn is_unlimited(&self) -> bool {
        let cached = *self.reported.read().await;
        match cached {
            Some(reported) => self.effective(reported),
            None => self.refresh().await,
        }
    }

    fn effective(&self, reported: bool) -> bool {
        let status = reported || self.purchased_here.load(Ordering::SeqCst);
        self.gate.effective_unlimited(status)
    }

    pub async fn remaining(&self, chats: &dyn ChatRepository, coach_id: &str) -> Remaining {
        let unlimited = self.is_unlimited().await;
        self.gate.remaining(chats, coach_id, unlimited).await
    }

    pub async fn admit(&self, chats: &dyn ChatRepository, coach_id: &str) -> Admission {
        let unlimited = self.is_unlimited().await;
        self.gate.admit(chats, coach_id, unlimited).await
    }

    /// Runs the purchase flow. A successful purchase lifts the quota for the
    /// rest of the process.
    pub async fn purchase(&self) -> PurchaseOutcome {
        let outcome = self.provider.purchase().await;
        self.record(&outcome, "purchase");
        outcome
    }

    pub async fn restore(&self) -> PurchaseOutcome {
        let outcome = self.provider.restore().await;
        self.record(&outcome, "restore");
        outcome
    }

    fn record(&self, outcome: &PurchaseOutcome, flow: &str) {
        match outcome {
            PurchaseOutcome::Purchased => {
                self.purchased_here.store(true, Ordering::SeqCst);
                tracing::info!(
                    "Subscription {} granted '{}', messages are now unlimited",
                    flow,
                    ENTITLEMENT_ID
                );
            }
            PurchaseOutcome::Cancelled => tracing::info!("Subscription {} cancelled", flow),
            PurchaseOutcome::Failed(reason) => {
                tracing::warn!("Subscription {} failed: {}", flow, reason)
            }
        }
    }
}
