//! Auto-drafting a persona for a new custom coach.
//!
//! Drafting never fails. Any problem on the way (no consent, transport,
//! HTTP status, unusable JSON) ends in a deterministic fallback draft.

use std::sync::Arc;

use nirvan_core::chat::ChatMessage;
use nirvan_core::coach::DEFAULT_ICON;
use nirvan_core::consent::ConsentRepository;
use serde_json::{Map, Value};

use crate::openai_client::{CompletionBackend, CompletionRequest};

pub const DRAFT_MAX_TOKENS: u32 = 350;

const DRAFT_SYSTEM_INSTRUCTION: &str =
    "You are an expert prompt engineer. You respond ONLY in valid JSON.";

/// Icons a drafted coach may pick from.
pub const DRAFT_ICONS: &[&str] = &[
    "Dumbbell",
    "Trophy",
    "Medal",
    "Palette",
    "Music",
    "Camera",
    "Code",
    "Cpu",
    "Globe",
    "Heart",
    "Sun",
    "Coffee",
    "Leaf",
    "BookOpen",
    "BrainCircuit",
    "Zap",
    "Lightbulb",
    "Compass",
    "Anchor",
    "Briefcase",
    "GraduationCap",
    "Gavel",
    "Stethoscope",
    "Sparkles",
];

/// Suggested values for the coach creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachDraft {
    pub prompt: String,
    pub description: String,
    pub icon: String,
}

impl CoachDraft {
    /// Draft used when the endpoint could not be asked.
    pub fn unreachable(name: &str, description: &str) -> Self {
        Self {
            prompt: format!("You are a specialized AI coach acting as: {name}. {description}"),
            description: non_empty_or(description, || format!("AI coach for {name}")),
            icon: DEFAULT_ICON.to_string(),
        }
    }

    /// Draft used when the endpoint answered with something unusable.
    pub fn unparseable(name: &str, description: &str) -> Self {
        Self {
            prompt: format!("You are a specialized AI coach acting as: {name}."),
            description: non_empty_or(description, || format!("Expert on {name}")),
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

fn non_empty_or(value: &str, fallback: impl FnOnce() -> String) -> String {
    if value.is_empty() {
        fallback()
    } else {
        value.to_string()
    }
}

pub struct PersonaDrafter {
    backend: Arc<dyn CompletionBackend>,
    consent: Arc<dyn ConsentRepository>,
    max_tokens: u32,
}

impl PersonaDrafter {
    pub fn new(backend: Arc<dyn CompletionBackend>, consent: Arc<dyn ConsentRepository>) -> Self {
        Self {
            backend,
            consent,
            max_tokens: DRAFT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Asks the completion endpoint for a system instruction, tagline and icon.
    pub async fn generate_system_prompt(&self, name: &str, description: &str) -> CoachDraft {
        if !self.consent.has_consented().await {
            tracing::info!("Skipping persona draft for '{}': consent not granted", name);
            return CoachDraft::unreachable(name, description);
        }

        let request = CompletionRequest::new(
            DRAFT_SYSTEM_INSTRUCTION,
            vec![ChatMessage::user(draft_prompt(name, description))],
        )
        .with_max_tokens(self.max_tokens);

        let content = match self.backend.complete(&request).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Persona draft request for '{}' failed: {}", name, e);
                return CoachDraft::unreachable(name, description);
            }
        };

        match parse_draft(name, &content) {
            Some(draft) => {
                tracing::debug!("Drafted persona for '{}' with icon {}", name, draft.icon);
                draft
            }
            None => {
                tracing::warn!("Could not parse persona draft for '{}'", name);
                CoachDraft::unparseable(name, description)
            }
        }
    }
}

fn draft_prompt(name: &str, description: &str) -> String {
    format!(
        r#"Create a DEEP, PROFOUND system instruction prompt AND a short description for an AI coach named "{name}".
User provided context (optional): "{description}".

IMPORTANT: Adapt the 'Persona Type' to the subject matter.

ALSO: Choose the most relevant icon name from this list: {icons}.

Return a JSON object with:
1. "prompt": The system instruction (at least 3 sentences).
2. "description": A short tagline.
3. "icon": The chosen icon name from the list."#,
        icons = DRAFT_ICONS.join(", ")
    )
}

/// Removes markdown code fences around a JSON payload.
fn strip_code_fences(content: &str) -> String {
    content
        .trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// First string value among `keys`.
fn text_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(|value| value.as_str())
        .filter(|text| !text.is_empty())
}

/// Any value among `keys` rendered as text, for the structured persona fields.
fn loose_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .filter(|text| !text.is_empty())
}

struct StructuredPersona {
    persona: String,
    tone: Option<String>,
    methodology: Option<String>,
}

impl StructuredPersona {
    fn from_object(object: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            persona: loose_field(object, &["Persona", "persona"])?,
            tone: loose_field(object, &["Tone", "tone"]),
            methodology: loose_field(object, &["Methodology", "methodology"]),
        })
    }

    fn render(&self, name: &str) -> String {
        format!(
            "You are an expert {name} coach acting as {}. Your tone is {}. {}",
            self.persona,
            self.tone.as_deref().unwrap_or_default(),
            self.methodology.as_deref().unwrap_or_default()
        )
    }
}

/// Interprets the drafted JSON. Returns `None` when the content is not a JSON object.
fn parse_draft(name: &str, content: &str) -> Option<CoachDraft> {
    let value: Value = serde_json::from_str(&strip_code_fences(content)).ok()?;
    let object = value.as_object()?;

    let root_persona = StructuredPersona::from_object(object)
        .filter(|p| p.tone.is_some() && p.methodology.is_some());

    let prompt = match (root_persona, object.get("prompt").or_else(|| object.get("Prompt"))) {
        (Some(persona), _) => persona.render(name),
        (None, Some(Value::Object(inner))) => match StructuredPersona::from_object(inner) {
            Some(persona) => persona.render(name),
            None => Value::Object(inner.clone()).to_string(),
        },
        (None, Some(Value::String(text))) if !text.is_empty() => text.clone(),
        _ => format!("You are a specialized AI coach acting as: {name}."),
    };

    let description = text_field(object, &["description", "Description"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("Expert on {name}"));

    let icon = text_field(object, &["icon", "Icon"])
        .filter(|icon| DRAFT_ICONS.iter().any(|known| known == icon))
        .unwrap_or(DEFAULT_ICON)
        .to_string();

    Some(CoachDraft {
        prompt,
        description,
        icon,
    })
}
