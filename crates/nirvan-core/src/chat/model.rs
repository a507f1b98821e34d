//! Chat message and session models.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Role of a persisted conversation turn.
///
/// The system turn only exists while a completion request is assembled and
/// is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// The persisted conversation for one coach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub coach_id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Epoch milliseconds of the last append
    #[serde(default)]
    pub last_updated: i64,
}

impl ChatSession {
    pub fn new(coach_id: impl Into<String>) -> Self {
        Self {
            coach_id: coach_id.into(),
            messages: Vec::new(),
            last_updated: Utc::now().timestamp_millis(),
        }
    }

    /// Appends a message and stamps `last_updated`.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.last_updated = Utc::now().timestamp_millis();
    }

    /// Number of user-authored turns; the quota is counted against this.
    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }
}

/// Whether an append created the session or extended an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Created,
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_count_ignores_assistant_turns() {
        let mut session = ChatSession::new("1");
        session.push(ChatMessage::user("hi"));
        session.push(ChatMessage::assistant("hello"));
        session.push(ChatMessage::user("help me focus"));
        assert_eq!(session.user_message_count(), 2);
        assert_eq!(session.messages.len(), 3);
    }

    #[test]
    fn test_session_wire_format() {
        let mut session = ChatSession::new("custom_abc");
        session.push(ChatMessage::user("hi"));
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["coachId"], "custom_abc");
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value["lastUpdated"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_system_role_is_not_a_stored_role() {
        let result: Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role": "system", "content": "x"}"#);
        assert!(result.is_err());
    }
}
