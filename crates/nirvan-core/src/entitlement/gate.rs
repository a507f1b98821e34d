//! Free-message quota gate.
//!
//! The gate is pure policy over the user-message count of a coach's session
//! and the externally reported subscription status. It owns no state and
//! does not stop anyone from appending messages directly.

use serde::{Deserialize, Serialize};

use crate::chat::ChatRepository;

/// Free user messages per coach before the upgrade flow is required.
pub const DEFAULT_FREE_MESSAGE_LIMIT: u32 = 5;

/// Debug override for the subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugOverride {
    /// Use whatever the subscription provider reports
    #[default]
    Off,
    /// Treat the user as subscribed
    ForceUnlimited,
    /// Treat the user as unsubscribed even after a purchase
    ForceLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementConfig {
    #[serde(default = "default_limit")]
    pub free_message_limit: u32,
    #[serde(default)]
    pub debug_override: DebugOverride,
}

fn default_limit() -> u32 {
    DEFAULT_FREE_MESSAGE_LIMIT
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            free_message_limit: DEFAULT_FREE_MESSAGE_LIMIT,
            debug_override: DebugOverride::Off,
        }
    }
}

/// Messages a user may still send to a coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Unlimited,
    Limited(u32),
}

impl Remaining {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Remaining::Limited(0))
    }
}

/// Admission decision for one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Route the user to the upgrade flow instead of the completion client
    UpgradeRequired,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EntitlementGate {
    config: EntitlementConfig,
}

impl EntitlementGate {
    pub fn new(config: EntitlementConfig) -> Self {
        Self { config }
    }

    pub fn limit(&self) -> u32 {
        self.config.free_message_limit
    }

    pub fn config(&self) -> EntitlementConfig {
        self.config
    }

    /// Applies the debug override to the provider-reported status.
    pub fn effective_unlimited(&self, reported: bool) -> bool {
        match self.config.debug_override {
            DebugOverride::Off => reported,
            DebugOverride::ForceUnlimited => true,
            DebugOverride::ForceLimited => false,
        }
    }

    pub fn remaining_for_count(&self, user_messages: usize, is_unlimited: bool) -> Remaining {
        if is_unlimited {
            return Remaining::Unlimited;
        }
        let used = u32::try_from(user_messages).unwrap_or(u32::MAX);
        Remaining::Limited(self.limit().saturating_sub(used))
    }

    pub fn can_send_for_count(&self, user_messages: usize, is_unlimited: bool) -> bool {
        is_unlimited || (user_messages as u64) < u64::from(self.limit())
    }

    pub async fn remaining(
        &self,
        chats: &dyn ChatRepository,
        coach_id: &str,
        is_unlimited: bool,
    ) -> Remaining {
        if is_unlimited {
            return Remaining::Unlimited;
        }
        let count = chats.count_user_messages(coach_id).await;
        self.remaining_for_count(count, false)
    }

    pub async fn can_send(
        &self,
        chats: &dyn ChatRepository,
        coach_id: &str,
        is_unlimited: bool,
    ) -> bool {
        if is_unlimited {
            return true;
        }
        let count = chats.count_user_messages(coach_id).await;
        self.can_send_for_count(count, false)
    }

    pub async fn admit(
        &self,
        chats: &dyn ChatRepository,
        coach_id: &str,
        is_unlimited: bool,
    ) -> Admission {
        if self.can_send(chats, coach_id, is_unlimited).await {
            Admission::Allowed
        } else {
            Admission::UpgradeRequired
        }
    }
}
