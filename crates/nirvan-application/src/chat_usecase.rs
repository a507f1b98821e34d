//! Chat use case.
//!
//! Drives one send from the chat screen: consent, quota, persistence of both
//! turns and the completion call in between.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nirvan_core::chat::{ChatMessage, ChatRepository};
use nirvan_core::consent::ConsentRepository;
use nirvan_core::entitlement::{Admission, PurchaseOutcome, Remaining};
use nirvan_core::user::UserContextRepository;
use nirvan_core::{NirvanError, Result};
use nirvan_interaction::{CoachCompletionService, PersonaRef};

use crate::entitlement_service::EntitlementService;

/// How a send attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Both turns were stored; carries the assistant text.
    Replied(String),
    /// The free quota for this coach is used up. Nothing was stored.
    UpgradeRequired,
    /// The consent prompt must be shown first. Nothing was stored.
    ConsentRequired,
    /// The completion failed. The user turn stays stored; carries text for
    /// an inline error bubble.
    Failed(String),
    /// Another send is still outstanding.
    Busy,
    /// Blank input.
    Ignored,
}

/// Clears the in-flight flag when a send finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatUseCase {
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserContextRepository>,
    consent: Arc<dyn ConsentRepository>,
    completion: Arc<CoachCompletionService>,
    entitlements: Arc<EntitlementService>,
    in_flight: AtomicBool,
}

impl ChatUseCase {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserContextRepository>,
        consent: Arc<dyn ConsentRepository>,
        completion: Arc<CoachCompletionService>,
        entitlements: Arc<EntitlementService>,
    ) -> Self {
        Self {
            chats,
            users,
            consent,
            completion,
            entitlements,
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn history(&self, coach_id: &str) -> Vec<ChatMessage> {
        self.chats.get_history(coach_id).await
    }

    pub async fn remaining(&self, coach_id: &str) -> Remaining {
        self.entitlements.remaining(self.chats.as_ref(), coach_id).await
    }

    pub async fn clear_history(&self, coach_id: &str) -> Result<()> {
        self.chats.clear_history(coach_id).await?;
        tracing::info!("Cleared chat history for coach {}", coach_id);
        Ok(())
    }

    pub async fn has_consented(&self) -> bool {
        self.consent.has_consented().await
    }

    /// Records the user's acceptance of data sharing.
    pub async fn accept_consent(&self) -> Result<()> {
        self.consent.set_consented().await?;
        tracing::info!("AI consent granted");
        Ok(())
    }

    /// Presents the purchase flow. The caller asks the user to resend after a
    /// successful purchase.
    pub async fn upgrade(&self) -> PurchaseOutcome {
        self.entitlements.purchase().await
    }

    pub async fn send_message(&self, coach_id: &str, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Send to {} refused: another send is outstanding", coach_id);
            return SendOutcome::Busy;
        };

        if !self.consent.has_consented().await {
            return SendOutcome::ConsentRequired;
        }

        if self.entitlements.admit(self.chats.as_ref(), coach_id).await
            == Admission::UpgradeRequired
        {
            tracing::info!("Free messages for coach {} used up", coach_id);
            return SendOutcome::UpgradeRequired;
        }

        let user_turn = ChatMessage::user(text);
        let stored = self.chats.append_message(coach_id, user_turn.clone()).await;
        let mut history = self.chats.get_history(coach_id).await;
        if let Err(e) = stored {
            tracing::warn!("User turn for {} was not stored: {}", coach_id, e);
            history.push(user_turn);
        }

        let user = self.users.get_user_context().await;
        let reply = self
            .completion
            .generate_reply(&history, &PersonaRef::coach(coach_id), user.as_ref())
            .await;

        match reply {
            Ok(reply) => {
                if let Err(e) = self
                    .chats
                    .append_message(coach_id, ChatMessage::assistant(reply.clone()))
                    .await
                {
                    tracing::warn!("Assistant turn for {} was not stored: {}", coach_id, e);
                }
                SendOutcome::Replied(reply)
            }
            Err(NirvanError::ConsentRequired) => SendOutcome::ConsentRequired,
            Err(e) => {
                tracing::error!("Chat error for coach {}: {}", coach_id, e);
                SendOutcome::Failed(e.user_message())
            }
        }
    }
}
