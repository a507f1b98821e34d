//! Coach catalog: built-in cards plus user-authored coaches.

use std::sync::Arc;

use nirvan_core::coach::{Coach, CoachRepository, CreateCoachRequest, builtin_coaches};
use nirvan_core::{NirvanError, Result};
use nirvan_interaction::{CoachDraft, PersonaDrafter};

/// Names this short are not worth a draft request.
const MIN_DRAFT_NAME_CHARS: usize = 3;

pub struct CoachCatalog {
    coaches: Arc<dyn CoachRepository>,
    drafter: Arc<PersonaDrafter>,
}

impl CoachCatalog {
    pub fn new(coaches: Arc<dyn CoachRepository>, drafter: Arc<PersonaDrafter>) -> Self {
        Self { coaches, drafter }
    }

    /// Built-in cards followed by custom coaches in creation order.
    pub async fn list_all(&self) -> Vec<Coach> {
        let mut all = builtin_coaches();
        all.extend(self.coaches.list_custom_coaches().await);
        all
    }

    pub async fn find(&self, id: &str) -> Option<Coach> {
        match builtin_coaches().into_iter().find(|coach| coach.id == id) {
            Some(coach) => Some(coach),
            None => self.coaches.find_custom_coach(id).await,
        }
    }

    pub async fn create(&self, request: CreateCoachRequest) -> Result<Coach> {
        let coach = request.into_coach()?;
        self.coaches.save_custom_coach(&coach).await?;
        tracing::info!("Created custom coach '{}' ({})", coach.display_name, coach.id);
        Ok(coach)
    }

    /// Deletes a custom coach. Built-in cards cannot be removed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !Coach::is_custom_id(id) {
            return Err(NirvanError::validation(format!(
                "Coach '{}' is built in and cannot be deleted",
                id
            )));
        }
        self.coaches.delete_custom_coach(id).await
    }

    /// Suggests a persona for the authoring form.
    ///
    /// Returns `None` without calling out when the name is too short.
    pub async fn draft(&self, name: &str, description: &str) -> Option<CoachDraft> {
        let name = name.trim();
        if name.chars().count() < MIN_DRAFT_NAME_CHARS {
            return None;
        }
        Some(self.drafter.generate_system_prompt(name, description).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nirvan_core::consent::ConsentRepository;
    use nirvan_infrastructure::{KvSessionStore, MemoryKeyValueStore};
    use nirvan_interaction::{CompletionBackend, CompletionRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CompletionBackend for CountingBackend {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"prompt":"You are a chef.","description":"Food","icon":"Coffee"}"#.to_string())
        }
    }

    async fn catalog() -> (Arc<CountingBackend>, CoachCatalog) {
        let store = Arc::new(KvSessionStore::new(Arc::new(MemoryKeyValueStore::new())));
        store.set_consented().await.unwrap();
        let backend = Arc::new(CountingBackend::default());
        let drafter = Arc::new(PersonaDrafter::new(backend.clone(), store.clone()));
        (backend, CoachCatalog::new(store, drafter))
    }

    fn request(name: &str) -> CreateCoachRequest {
        CreateCoachRequest {
            name: name.to_string(),
            description: "Cooking mentor".to_string(),
            system_instruction: "You are a patient chef.".to_string(),
            icon: Some("Coffee".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_all_puts_builtins_first() {
        let (_, catalog) = catalog().await;
        let created = catalog.create(request("Chef")).await.unwrap();

        let all = catalog.list_all().await;
        assert_eq!(all.len(), 7);
        assert_eq!(all[0].id, "1");
        assert_eq!(all[6], created);
        assert!(created.id.starts_with("custom_"));
        assert_eq!(catalog.find("custom_nope").await, None);
        assert_eq!(catalog.find("3").await.unwrap().display_name, "Mindfulness Coach");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let (_, catalog) = catalog().await;
        let err = catalog.create(request("   ")).await.unwrap_err();
        assert!(matches!(err, NirvanError::Validation(_)));
        assert_eq!(catalog.list_all().await.len(), 6);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_, catalog) = catalog().await;
        let created = catalog.create(request("Chef")).await.unwrap();

        assert!(catalog.delete("1").await.is_err());
        catalog.delete(&created.id).await.unwrap();
        assert_eq!(catalog.list_all().await.len(), 6);
    }

    #[tokio::test]
    async fn test_draft_needs_three_characters() {
        let (backend, catalog) = catalog().await;
        assert!(catalog.draft("Al", "").await.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        let draft = catalog.draft("Chef", "").await.unwrap();
        assert_eq!(draft.icon, "Coffee");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
