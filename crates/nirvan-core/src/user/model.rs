//! UserContext domain model.
//!
//! The human's self-described preferences, used to personalise every
//! completion request.

use serde::{Deserialize, Serialize};

/// Placeholder used when the user has not given a name.
pub const DEFAULT_USER_NAME: &str = "User";

/// Singleton record of the user's preferences. Always overwritten as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: String,
    #[serde(default)]
    pub focus: String,
}

impl UserContext {
    pub fn new(
        name: impl Into<String>,
        values: impl Into<String>,
        focus: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            focus: focus.into(),
        }
    }

    /// The name to address the user by; blank names become the placeholder.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_USER_NAME
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_uses_placeholder() {
        let ctx = UserContext::new("  ", "honesty", "health");
        assert_eq!(ctx.display_name(), "User");
    }

    #[test]
    fn test_missing_name_field_deserializes() {
        let ctx: UserContext =
            serde_json::from_str(r#"{"values": "family", "focus": "sleep"}"#).unwrap();
        assert_eq!(ctx.display_name(), DEFAULT_USER_NAME);
        assert_eq!(ctx.values, "family");
    }
}
