//! Custom coach creation request.

use serde::{Deserialize, Serialize};

use super::model::{Coach, DEFAULT_ICON};
use crate::error::{NirvanError, Result};

/// Request to create a user-authored coach from the authoring form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCoachRequest {
    /// Display name (required)
    pub name: String,
    /// Short tagline (required)
    pub description: String,
    /// Behavioral prompt (required)
    pub system_instruction: String,
    /// Optional icon name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CreateCoachRequest {
    /// Validate the request. All text fields must be non-blank.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(NirvanError::validation("Name is required and cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(NirvanError::validation(
                "Description is required and cannot be empty",
            ));
        }
        if self.system_instruction.trim().is_empty() {
            return Err(NirvanError::validation(
                "System instruction is required and cannot be empty",
            ));
        }
        Ok(())
    }

    /// Validates and converts the request into a new coach with a fresh id.
    pub fn into_coach(self) -> Result<Coach> {
        self.validate()?;
        let icon_name = self
            .icon
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        Ok(Coach {
            id: Coach::generate_custom_id(),
            display_name: self.name,
            short_description: self.description,
            icon_name,
            system_instruction: self.system_instruction,
            is_user_authored: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateCoachRequest {
        CreateCoachRequest {
            name: "Chef".to_string(),
            description: "Cooking mentor".to_string(),
            system_instruction: "You are a patient chef.".to_string(),
            icon: None,
        }
    }

    #[test]
    fn test_into_coach() {
        let coach = request().into_coach().unwrap();
        assert!(Coach::is_custom_id(&coach.id));
        assert!(coach.is_user_authored);
        assert_eq!(coach.icon_name, DEFAULT_ICON);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut req = request();
        req.name = "   ".to_string();
        let err = req.into_coach().unwrap_err();
        assert!(matches!(err, NirvanError::Validation(_)));
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let mut req = request();
        req.system_instruction = String::new();
        assert!(req.validate().is_err());
    }
}
