//! Chat repository trait.

use super::model::{AppendOutcome, ChatMessage, ChatSession};
use crate::error::Result;

/// Persistence for per-coach chat sessions.
///
/// Appending is the only mutation of a session. Sessions are created on the
/// first append (an explicit upsert) and the outcome reports which path was
/// taken.
#[async_trait::async_trait]
pub trait ChatRepository: Send + Sync {
    /// Appends a message to the coach's session, creating it if absent.
    async fn append_message(&self, coach_id: &str, message: ChatMessage) -> Result<AppendOutcome>;

    /// Returns the full session, or `None` if the coach has no history.
    async fn get_session(&self, coach_id: &str) -> Option<ChatSession>;

    /// Removes one coach's session. Absent sessions are a no-op.
    async fn clear_history(&self, coach_id: &str) -> Result<()>;

    /// Ordered message log, empty when no session exists.
    async fn get_history(&self, coach_id: &str) -> Vec<ChatMessage> {
        self.get_session(coach_id)
            .await
            .map(|session| session.messages)
            .unwrap_or_default()
    }

    async fn count_user_messages(&self, coach_id: &str) -> usize {
        self.get_session(coach_id)
            .await
            .map(|session| session.user_message_count())
            .unwrap_or(0)
    }
}
