//! Coach replies: persona resolution, personalization and the consent gate.

use std::sync::Arc;

use nirvan_core::chat::ChatMessage;
use nirvan_core::coach::{CoachRepository, DEFAULT_INSTRUCTION, builtin_instruction_for_coach};
use nirvan_core::consent::ConsentRepository;
use nirvan_core::user::UserContext;
use nirvan_core::{NirvanError, Result};

use crate::openai_client::{CompletionBackend, CompletionRequest};

const NOT_SPECIFIED: &str = "Not specified";

/// Which persona a reply is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaRef {
    /// A built-in card id, built-in instruction key or custom coach id.
    CoachId(String),
    /// A literal system instruction.
    Instruction(String),
}

impl PersonaRef {
    pub fn coach(id: impl Into<String>) -> Self {
        PersonaRef::CoachId(id.into())
    }
}

/// Appends the user's preferences to a system instruction.
pub fn personalize(instruction: &str, user: &UserContext) -> String {
    let name = user.display_name();
    let values = non_blank_or(&user.values, NOT_SPECIFIED);
    let focus = non_blank_or(&user.focus, NOT_SPECIFIED);
    format!(
        "{instruction}\n\nUSER CONTEXT:\n- Name: {name}\n- Values: {values}\n- Current Focus: {focus}\n\nTailor your advice to align with these values and focus. Address the user as {name}."
    )
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

pub struct CoachCompletionService {
    backend: Arc<dyn CompletionBackend>,
    consent: Arc<dyn ConsentRepository>,
    coaches: Arc<dyn CoachRepository>,
}

impl CoachCompletionService {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        consent: Arc<dyn ConsentRepository>,
        coaches: Arc<dyn CoachRepository>,
    ) -> Self {
        Self {
            backend,
            consent,
            coaches,
        }
    }

    /// Resolves a persona to its base system instruction.
    ///
    /// Ids are looked up in the built-in table, then among custom coaches,
    /// and fall back to the default instruction.
    pub async fn resolve_instruction(&self, persona: &PersonaRef) -> String {
        match persona {
            PersonaRef::Instruction(text) => text.clone(),
            PersonaRef::CoachId(id) => {
                if let Some(text) = builtin_instruction_for_coach(id) {
                    return text.to_string();
                }
                if let Some(coach) = self.coaches.find_custom_coach(id).await {
                    return coach.system_instruction;
                }
                tracing::debug!("No instruction for coach '{}', using default", id);
                DEFAULT_INSTRUCTION.to_string()
            }
        }
    }

    /// Produces the assistant's next turn for `history`.
    ///
    /// Fails with [`NirvanError::ConsentRequired`] before any network
    /// activity when the user has not accepted data sharing.
    pub async fn generate_reply(
        &self,
        history: &[ChatMessage],
        persona: &PersonaRef,
        user: Option<&UserContext>,
    ) -> Result<String> {
        if !self.consent.has_consented().await {
            tracing::info!("Completion refused: consent not granted");
            return Err(NirvanError::ConsentRequired);
        }

        let base = self.resolve_instruction(persona).await;
        let instruction = match user {
            Some(user) => personalize(&base, user),
            None => base,
        };

        let request = CompletionRequest::new(instruction, history.to_vec());
        self.backend.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nirvan_core::coach::{BuiltinInstruction, Coach};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait::async_trait]
    impl CompletionBackend for RecordingBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            Ok("Take one small step today.".to_string())
        }
    }

    struct Consent(AtomicBool);

    #[async_trait::async_trait]
    impl ConsentRepository for Consent {
        async fn has_consented(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
        async fn set_consented(&self) -> Result<()> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Coaches(Vec<Coach>);

    #[async_trait::async_trait]
    impl CoachRepository for Coaches {
        async fn save_custom_coach(&self, _coach: &Coach) -> Result<()> {
            Ok(())
        }
        async fn delete_custom_coach(&self, _id: &str) -> Result<()> {
            Ok(())
        }
        async fn list_custom_coaches(&self) -> Vec<Coach> {
            self.0.clone()
        }
    }

    fn service(consented: bool) -> (Arc<RecordingBackend>, CoachCompletionService) {
        let backend = Arc::new(RecordingBackend::default());
        let chef = Coach {
            id: "custom_chef".to_string(),
            display_name: "Chef".to_string(),
            short_description: String::new(),
            icon_name: "Coffee".to_string(),
            system_instruction: "You are a chef.".to_string(),
            is_user_authored: true,
        };
        let service = CoachCompletionService::new(
            backend.clone(),
            Arc::new(Consent(AtomicBool::new(consented))),
            Arc::new(Coaches(vec![chef])),
        );
        (backend, service)
    }

    #[tokio::test]
    async fn test_no_consent_means_no_request() {
        let (backend, service) = service(false);
        let err = service
            .generate_reply(&[ChatMessage::user("hi")], &PersonaRef::coach("1"), None)
            .await
            .unwrap_err();
        assert!(err.is_consent_required());
        assert!(backend.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_order() {
        let (_, service) = service(true);
        assert_eq!(
            service.resolve_instruction(&PersonaRef::coach("1")).await,
            BuiltinInstruction::Productivity.text()
        );
        assert_eq!(
            service.resolve_instruction(&PersonaRef::coach("creative")).await,
            BuiltinInstruction::Creative.text()
        );
        assert_eq!(
            service.resolve_instruction(&PersonaRef::coach("custom_chef")).await,
            "You are a chef."
        );
        assert_eq!(
            service.resolve_instruction(&PersonaRef::coach("6")).await,
            DEFAULT_INSTRUCTION
        );
        assert_eq!(
            service
                .resolve_instruction(&PersonaRef::Instruction("Be brief.".into()))
                .await,
            "Be brief."
        );
    }

    #[tokio::test]
    async fn test_reply_request_shape() {
        let (backend, service) = service(true);
        let history = vec![
            ChatMessage::user("I keep procrastinating"),
            ChatMessage::assistant("What is blocking you?"),
            ChatMessage::user("Email"),
        ];
        let user = UserContext::new("Ana", "calm", "");

        let reply = service
            .generate_reply(&history, &PersonaRef::coach("custom_chef"), Some(&user))
            .await
            .unwrap();
        assert_eq!(reply, "Take one small step today.");

        let requests = backend.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.turns, history);
        assert!(request.system_instruction.starts_with("You are a chef.\n\nUSER CONTEXT:"));
        assert!(request.system_instruction.contains("- Current Focus: Not specified"));
        assert!(request.system_instruction.ends_with("Address the user as Ana."));
    }

    #[test]
    fn test_personalize_blank_fields() {
        let text = personalize("Base.", &UserContext::default());
        assert_eq!(
            text,
            "Base.\n\nUSER CONTEXT:\n- Name: User\n- Values: Not specified\n- Current Focus: Not specified\n\nTailor your advice to align with these values and focus. Address the user as User."
        );
    }
}
