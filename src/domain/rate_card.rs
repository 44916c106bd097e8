use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::{new_record_id, Identifiable};
use crate::errors::ProjectError;

/// Distinguishes rate cards for internal staff from external/vendor roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RateCategory {
    Internal,
    External,
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RateCategory::Internal => "Internal",
            RateCategory::External => "External",
        };
        f.write_str(label)
    }
}

/// A named role-to-daily-rate mapping tagged with a category.
///
/// Resources reference rate cards by role name only; a dangling reference
/// resolves to a rate of 0 rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateCard {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub rate: f64,
    pub category: RateCategory,
}

impl RateCard {
    pub fn new(role: impl Into<String>, rate: f64, category: RateCategory) -> Self {
        Self {
            id: new_record_id(),
            role: role.into(),
            rate,
            category,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.role.trim().is_empty() {
            return Err(ProjectError::Validation("rate card role is required".into()));
        }
        if self.rate < 0.0 {
            return Err(ProjectError::Validation(format!(
                "rate for role `{}` must not be negative",
                self.role
            )));
        }
        Ok(())
    }
}

impl Identifiable for RateCard {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Resolves the daily rate for a role within a category, first match wins.
///
/// Unknown roles resolve to 0.0 so a deleted rate card never breaks
/// aggregation of the resources that referenced it.
pub fn rate_for_role(cards: &[RateCard], category: RateCategory, role: &str) -> f64 {
    cards
        .iter()
        .find(|card| card.category == category && card.role == role)
        .map(|card| card.rate)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_lookup_matches_category_and_role() {
        let cards = vec![
            RateCard::new("PM", 800.0, RateCategory::Internal),
            RateCard::new("PM", 1100.0, RateCategory::External),
        ];
        assert_eq!(rate_for_role(&cards, RateCategory::Internal, "PM"), 800.0);
        assert_eq!(rate_for_role(&cards, RateCategory::External, "PM"), 1100.0);
    }

    #[test]
    fn unknown_role_resolves_to_zero() {
        let cards = vec![RateCard::new("Dev", 650.0, RateCategory::Internal)];
        assert_eq!(rate_for_role(&cards, RateCategory::Internal, "Architect"), 0.0);
    }

    #[test]
    fn negative_rate_fails_validation() {
        let card = RateCard::new("QA", -10.0, RateCategory::Internal);
        assert!(card.validate().is_err());
    }
}
