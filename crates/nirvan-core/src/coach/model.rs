//! Coach domain model.
//!
//! A coach is a named persona that supplies the system instruction for
//! completion requests. Built-in coaches are static; user-authored coaches
//! are persisted by the session store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix that distinguishes user-authored coach ids from built-in ones.
pub const CUSTOM_COACH_ID_PREFIX: &str = "custom_";

/// Icon used whenever no better icon is known.
pub const DEFAULT_ICON: &str = "Sparkles";

/// A persona definition.
///
/// Field names on the wire are kept compatible with records written by the
/// mobile client (`text`, `subtitle`, `icon`, `systemPrompt`, `isCustom`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Coach {
    /// Unique identifier
    pub id: String,
    /// Display name of the coach
    #[serde(rename = "text")]
    pub display_name: String,
    /// One-line description shown under the name
    #[serde(rename = "subtitle", default)]
    pub short_description: String,
    /// Icon name from the icon set
    #[serde(rename = "icon", default = "default_icon")]
    pub icon_name: String,
    /// Behavioral prompt sent as the system turn
    #[serde(rename = "systemPrompt", default)]
    pub system_instruction: String,
    /// Whether the user authored this coach
    #[serde(rename = "isCustom", default)]
    pub is_user_authored: bool,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

impl Coach {
    /// Generates a fresh identifier for a user-authored coach.
    pub fn generate_custom_id() -> String {
        format!("{}{}", CUSTOM_COACH_ID_PREFIX, Uuid::new_v4().simple())
    }

    /// Returns true if the id has the user-authored prefix.
    pub fn is_custom_id(id: &str) -> bool {
        id.starts_with(CUSTOM_COACH_ID_PREFIX)
    }
}

/// What happens to a coach's chat log when the coach is deleted.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoachDeletePolicy {
    /// Keep the chat session; it becomes unreachable from the catalog
    #[default]
    RetainHistory,
    /// Remove the chat session together with the coach
    DeleteHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = Coach::generate_custom_id();
        let b = Coach::generate_custom_id();
        assert!(Coach::is_custom_id(&a));
        assert_ne!(a, b);
        assert!(!Coach::is_custom_id("1"));
    }

    #[test]
    fn test_deserialize_mobile_record() {
        let json = r#"{
            "id": "custom_1712345678901",
            "text": "Chef",
            "subtitle": "Cooking mentor",
            "icon": "Coffee",
            "systemPrompt": "You are a chef.",
            "isCustom": true
        }"#;
        let coach: Coach = serde_json::from_str(json).unwrap();
        assert_eq!(coach.display_name, "Chef");
        assert_eq!(coach.icon_name, "Coffee");
        assert!(coach.is_user_authored);
    }

    #[test]
    fn test_missing_icon_defaults_to_sparkles() {
        let json = r#"{"id": "custom_x", "text": "Chef"}"#;
        let coach: Coach = serde_json::from_str(json).unwrap();
        assert_eq!(coach.icon_name, DEFAULT_ICON);
        assert!(!coach.is_user_authored);
    }
}
