//! Configuration models.
//!
//! `AppConfig` mirrors `~/.config/nirvan/config.toml`; every section and
//! field has a default so a missing or partial file is valid.
//! `SecretConfig` mirrors `~/.config/nirvan/secret.json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::coach::CoachDeletePolicy;
use crate::entitlement::EntitlementConfig;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Root of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub entitlement: EntitlementConfig,
    #[serde(default)]
    pub coach: CoachConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// Which key-value backend to open at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single JSON file on disk
    #[default]
    File,
    /// Process-local map, nothing survives a restart
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Overrides the default store file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default)]
    pub delete_policy: CoachDeletePolicy,
}

/// Completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Token budget for persona auto-drafting
    #[serde(default = "default_draft_max_tokens")]
    pub draft_max_tokens: u32,
}

fn default_base_url() -> String {
    DEFAULT_COMPLETION_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_draft_max_tokens() -> u32 {
    350
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            draft_max_tokens: default_draft_max_tokens(),
        }
    }
}

/// Root of secret.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAIConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlement::{DEFAULT_FREE_MESSAGE_LIMIT, DebugOverride};

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            config.entitlement.free_message_limit,
            DEFAULT_FREE_MESSAGE_LIMIT
        );
        assert_eq!(config.completion.max_tokens, 300);
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            backend = "memory"

            [entitlement]
            free_message_limit = 25
            debug_override = "force_unlimited"

            [coach]
            delete_policy = "delete_history"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.entitlement.free_message_limit, 25);
        assert_eq!(
            config.entitlement.debug_override,
            DebugOverride::ForceUnlimited
        );
        assert_eq!(config.coach.delete_policy, CoachDeletePolicy::DeleteHistory);
        assert_eq!(config.completion.model, DEFAULT_COMPLETION_MODEL);
    }
}
