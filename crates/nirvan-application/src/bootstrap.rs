//! Wiring of the whole coach core from an [`AppConfig`].

use std::sync::Arc;

use anyhow::Context;
use nirvan_core::config::AppConfig;
use nirvan_core::entitlement::{EntitlementGate, SubscriptionProvider};
use nirvan_core::user::{UserContext, UserContextRepository};
use nirvan_infrastructure::storage::ConfigStorage;
use nirvan_infrastructure::{KvSessionStore, open_store};
use nirvan_interaction::{
    CoachCompletionService, CompletionBackend, OpenAiCompletionClient, PersonaDrafter,
};

use crate::chat_usecase::ChatUseCase;
use crate::coach_catalog::CoachCatalog;
use crate::entitlement_service::EntitlementService;

pub struct NirvanApp {
    config: AppConfig,
    store: Arc<KvSessionStore>,
    entitlements: Arc<EntitlementService>,
    chat: ChatUseCase,
    catalog: CoachCatalog,
}

impl NirvanApp {
    /// Reads `~/.config/nirvan/config.toml` and the API key, then wires
    /// everything against the real completion endpoint.
    pub fn load(provider: Arc<dyn SubscriptionProvider>) -> anyhow::Result<Self> {
        let config = ConfigStorage::new()
            .and_then(|storage| storage.load())
            .context("Failed to load nirvan configuration")?;
        let client = OpenAiCompletionClient::from_config(&config.completion)
            .context("Failed to configure the completion client")?;
        Self::build(config, Arc::new(client), provider)
    }

    pub fn build(
        config: AppConfig,
        backend: Arc<dyn CompletionBackend>,
        provider: Arc<dyn SubscriptionProvider>,
    ) -> anyhow::Result<Self> {
        let kv = open_store(&config.storage).context("Failed to open the key-value store")?;
        let store = Arc::new(KvSessionStore::with_delete_policy(
            kv,
            config.coach.delete_policy,
        ));

        let entitlements = Arc::new(EntitlementService::new(
            provider,
            EntitlementGate::new(config.entitlement),
        ));
        let completion = Arc::new(CoachCompletionService::new(
            backend.clone(),
            store.clone(),
            store.clone(),
        ));
        let drafter = Arc::new(
            PersonaDrafter::new(backend, store.clone())
                .with_max_tokens(config.completion.draft_max_tokens),
        );

        let chat = ChatUseCase::new(
            store.clone(),
            store.clone(),
            store.clone(),
            completion,
            entitlements.clone(),
        );
        let catalog = CoachCatalog::new(store.clone(), drafter);

        tracing::info!(
            "Nirvan core ready (storage={:?}, free_message_limit={}, delete_policy={:?})",
            config.storage.backend,
            config.entitlement.free_message_limit,
            config.coach.delete_policy
        );

        Ok(Self {
            config,
            store,
            entitlements,
            chat,
            catalog,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn chat(&self) -> &ChatUseCase {
        &self.chat
    }

    pub fn catalog(&self) -> &CoachCatalog {
        &self.catalog
    }

    pub fn entitlements(&self) -> &EntitlementService {
        &self.entitlements
    }

    pub async fn user_context(&self) -> UserContext {
        self.store.get_user_context().await.unwrap_or_default()
    }

    pub async fn save_user_context(&self, context: &UserContext) -> nirvan_core::Result<()> {
        self.store.save_user_context(context).await
    }

    /// Deletes every coach, chat, preference and the consent flag.
    pub async fn reset_all_data(&self) -> nirvan_core::Result<()> {
        tracing::warn!("Resetting all nirvan data");
        self.store.clear_all().await
    }
}
