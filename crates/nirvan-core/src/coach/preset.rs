//! Built-in coaches.
//!
//! The home screen offers six fixed coach cards. Only some of them have a
//! dedicated system instruction; the rest fall back to the default coach.

use super::model::Coach;

pub const DEFAULT_INSTRUCTION: &str = "You are a minimalist life coach named Nirvan. You help the user find clarity and purpose through simple, direct advice.";

const PRODUCTIVITY_INSTRUCTION: &str = "You are a ruthless but calm Productivity Coach. You value systems, focus, and deep work. You speak concisely and ask probing questions about the user's blockers.";

const CREATIVE_INSTRUCTION: &str = "You are a creative muse. You encourage divergent thinking, unconventional ideas, and artistic expression. You speak in metaphors and inspire the user.";

const SYSTEMS_INSTRUCTION: &str = "You are a Systems Architect. You see life as a series of interconnected loops. You help the user optimize their workflows and habits. You speak in terms of inputs, outputs, and bottlenecks.";

/// Named built-in system instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinInstruction {
    Productivity,
    Creative,
    Systems,
    Default,
}

impl BuiltinInstruction {
    pub fn all() -> [BuiltinInstruction; 4] {
        [
            BuiltinInstruction::Productivity,
            BuiltinInstruction::Creative,
            BuiltinInstruction::Systems,
            BuiltinInstruction::Default,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            BuiltinInstruction::Productivity => "productivity",
            BuiltinInstruction::Creative => "creative",
            BuiltinInstruction::Systems => "systems",
            BuiltinInstruction::Default => "default",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            BuiltinInstruction::Productivity => PRODUCTIVITY_INSTRUCTION,
            BuiltinInstruction::Creative => CREATIVE_INSTRUCTION,
            BuiltinInstruction::Systems => SYSTEMS_INSTRUCTION,
            BuiltinInstruction::Default => DEFAULT_INSTRUCTION,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|b| b.key() == key)
    }
}

/// Looks up a built-in instruction by key (`productivity`, `creative`, ...).
pub fn builtin_instruction(key: &str) -> Option<&'static str> {
    BuiltinInstruction::from_key(key).map(|b| b.text())
}

/// Resolves a coach id against the built-in table.
///
/// Card ids `1`, `2` and `3` map onto the productivity, creative and systems
/// instructions; any other id is looked up as an instruction key directly.
pub fn builtin_instruction_for_coach(coach_id: &str) -> Option<&'static str> {
    let key = match coach_id {
        "1" => "productivity",
        "2" => "creative",
        "3" => "systems",
        other => other,
    };
    builtin_instruction(key)
}

fn card(id: &str, name: &str, description: &str, icon: &str) -> Coach {
    Coach {
        id: id.to_string(),
        display_name: name.to_string(),
        short_description: description.to_string(),
        icon_name: icon.to_string(),
        system_instruction: builtin_instruction_for_coach(id)
            .unwrap_or(DEFAULT_INSTRUCTION)
            .to_string(),
        is_user_authored: false,
    }
}

/// Returns the built-in coach cards in display order.
pub fn builtin_coaches() -> Vec<Coach> {
    vec![
        card(
            "1",
            "Fitness Coach",
            "Personalized workout plans, nutrition guidance, and progress tracking.",
            "Dumbbell",
        ),
        card(
            "2",
            "Career Coach",
            "Resume optimization, interview prep, and professional development.",
            "Briefcase",
        ),
        card(
            "3",
            "Mindfulness Coach",
            "Stress management, meditation techniques, and mental wellness.",
            "Brain",
        ),
        card(
            "4",
            "Relationship Coach",
            "Communication skills, conflict resolution, and healthy relationships.",
            "Heart",
        ),
        card(
            "5",
            "Finance Coach",
            "Budgeting strategies, investment advice, and financial goal setting.",
            "DollarSign",
        ),
        card(
            "6",
            "Productivity Coach",
            "Time management, goal setting, habit formation, and workflow optimization.",
            "Activity",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_ids_map_to_instructions() {
        assert_eq!(
            builtin_instruction_for_coach("1"),
            Some(PRODUCTIVITY_INSTRUCTION)
        );
        assert_eq!(builtin_instruction_for_coach("2"), Some(CREATIVE_INSTRUCTION));
        assert_eq!(builtin_instruction_for_coach("3"), Some(SYSTEMS_INSTRUCTION));
        assert_eq!(builtin_instruction_for_coach("4"), None);
        assert_eq!(
            builtin_instruction_for_coach("default"),
            Some(DEFAULT_INSTRUCTION)
        );
    }

    #[test]
    fn test_builtin_coaches_are_not_user_authored() {
        let coaches = builtin_coaches();
        assert_eq!(coaches.len(), 6);
        assert!(coaches.iter().all(|c| !c.is_user_authored));
        assert_eq!(coaches[3].system_instruction, DEFAULT_INSTRUCTION);
    }
}
