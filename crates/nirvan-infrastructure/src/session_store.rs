//! Key-value backed implementation of every nirvan repository.
//!
//! Records are JSON documents under fixed keys:
//!
//! | Key | Value |
//! |---|---|
//! | `nirvan_coaches_v1` | `[Coach]` |
//! | `nirvan_chats_v1` | `{ coachId: ChatSession }` |
//! | `nirvan_prefs_v1` | `UserContext` |
//! | `nirvan_ai_consent_v1` | `bool` |
//!
//! Reads never fail: a missing key, a backend error or an unparseable
//! document all read as "no data" and are logged. Writes report errors to
//! the caller after logging them. A write that has to read its collection
//! first aborts when the backend read fails, so an outage cannot rewrite
//! the collection without the records it could not see.

use std::collections::BTreeMap;
use std::sync::Arc;

use nirvan_core::Result;
use nirvan_core::chat::{AppendOutcome, ChatMessage, ChatRepository, ChatSession};
use nirvan_core::coach::{Coach, CoachDeletePolicy, CoachRepository};
use nirvan_core::consent::ConsentRepository;
use nirvan_core::user::{UserContext, UserContextRepository};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::kv::KeyValueStore;

pub const COACHES_KEY: &str = "nirvan_coaches_v1";
pub const CHATS_KEY: &str = "nirvan_chats_v1";
pub const PREFS_KEY: &str = "nirvan_prefs_v1";
pub const CONSENT_KEY: &str = "nirvan_ai_consent_v1";

type ChatMap = BTreeMap<String, ChatSession>;

pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
    delete_policy: CoachDeletePolicy,
    /// Serialises read-modify-write cycles so overlapping appends cannot
    /// drop each other's updates.
    write_lock: Mutex<()>,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_delete_policy(kv, CoachDeletePolicy::default())
    }

    pub fn with_delete_policy(kv: Arc<dyn KeyValueStore>, delete_policy: CoachDeletePolicy) -> Self {
        Self {
            kv,
            delete_policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn delete_policy(&self) -> CoachDeletePolicy {
        self.delete_policy
    }

    /// Wipes every key the store owns. Unlike other writes, the caller is
    /// expected to surface a failure here.
    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.clear_all().await.inspect_err(|e| {
            tracing::error!("Failed to clear all data: {}", e);
        })?;
        tracing::info!("Cleared all coaches, chats, preferences and consent");
        Ok(())
    }

    /// Reads a record for display. Backend failures and unparseable
    /// documents both read as `None`.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_for_update(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    /// Reads a record that is about to be rewritten.
    ///
    /// An unparseable document reads as `None` so the write replaces it, but
    /// a backend failure is returned: writing after a failed read would
    /// overwrite data that was never seen.
    async fn read_for_update<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, raw).await.inspect_err(|e| {
            tracing::error!("Failed to write '{}': {}", key, e);
        })?;
        tracing::debug!("Wrote '{}'", key);
        Ok(())
    }

    async fn load_chats(&self) -> ChatMap {
        self.read_json(CHATS_KEY).await.unwrap_or_default()
    }

    async fn load_coaches(&self) -> Vec<Coach> {
        self.read_json(COACHES_KEY).await.unwrap_or_default()
    }

    async fn load_chats_for_update(&self) -> Result<ChatMap> {
        let chats = self.read_for_update(CHATS_KEY).await.inspect_err(|e| {
            tracing::error!("Chat sessions left untouched, read failed: {}", e);
        })?;
        Ok(chats.unwrap_or_default())
    }

    async fn load_coaches_for_update(&self) -> Result<Vec<Coach>> {
        let coaches = self.read_for_update(COACHES_KEY).await.inspect_err(|e| {
            tracing::error!("Custom coaches left untouched, read failed: {}", e);
        })?;
        Ok(coaches.unwrap_or_default())
    }

    async fn remove_session(&self, coach_id: &str) -> Result<()> {
        let mut chats = self.load_chats_for_update().await?;
        if chats.remove(coach_id).is_none() {
            return Ok(());
        }
        self.write_json(CHATS_KEY, &chats).await
    }
}

#[async_trait::async_trait]
impl CoachRepository for KvSessionStore {
    async fn save_custom_coach(&self, coach: &Coach) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut coaches = self.load_coaches_for_update().await?;
        coaches.push(coach.clone());
        tracing::info!(
            "Saving coach '{}' ({}), total custom coaches: {}",
            coach.display_name,
            coach.id,
            coaches.len()
        );
        self.write_json(COACHES_KEY, &coaches).await
    }

    async fn delete_custom_coach(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let coaches = self.load_coaches_for_update().await?;
        let before = coaches.len();
        let remaining: Vec<Coach> = coaches.into_iter().filter(|c| c.id != id).collect();

        if remaining.len() != before {
            self.write_json(COACHES_KEY, &remaining).await?;
            tracing::info!("Deleted custom coach {}", id);
        }

        if self.delete_policy == CoachDeletePolicy::DeleteHistory {
            self.remove_session(id).await?;
        }
        Ok(())
    }

    async fn list_custom_coaches(&self) -> Vec<Coach> {
        self.load_coaches().await
    }
}

#[async_trait::async_trait]
impl ChatRepository for KvSessionStore {
    async fn append_message(&self, coach_id: &str, message: ChatMessage) -> Result<AppendOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut chats = self.load_chats_for_update().await?;

        let outcome = if chats.contains_key(coach_id) {
            AppendOutcome::Updated
        } else {
            AppendOutcome::Created
        };

        chats
            .entry(coach_id.to_string())
            .or_insert_with(|| ChatSession::new(coach_id))
            .push(message);

        self.write_json(CHATS_KEY, &chats).await?;
        Ok(outcome)
    }

    async fn get_session(&self, coach_id: &str) -> Option<ChatSession> {
        self.load_chats().await.remove(coach_id)
    }

    async fn clear_history(&self, coach_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.remove_session(coach_id).await
    }
}

#[async_trait::async_trait]
impl UserContextRepository for KvSessionStore {
    async fn save_user_context(&self, context: &UserContext) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_json(PREFS_KEY, context).await
    }

    async fn get_user_context(&self) -> Option<UserContext> {
        self.read_json(PREFS_KEY).await
    }
}

#[async_trait::async_trait]
impl ConsentRepository for KvSessionStore {
    async fn has_consented(&self) -> bool {
        self.read_json::<bool>(CONSENT_KEY).await.unwrap_or(false)
    }

    async fn set_consented(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_json(CONSENT_KEY, &true).await
    }
}
