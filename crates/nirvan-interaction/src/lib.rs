//! Talking to the completion endpoint on behalf of a coach.

pub mod completion;
pub mod openai_client;
pub mod persona_draft;

pub use completion::{CoachCompletionService, PersonaRef, personalize};
pub use openai_client::{CompletionBackend, CompletionRequest, OpenAiCompletionClient};
pub use persona_draft::{CoachDraft, PersonaDrafter};
