//! The project document: one in-memory instance owns every line item and
//! rate card, and serializes wholesale into the persisted JSON shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{new_record_id, Identifiable};
use super::line_items::{InternalResource, MiscCost, Risk, ToolCost, VendorCost};
use super::rate_card::{rate_for_role, RateCard, RateCategory};
use crate::errors::ProjectError;

/// Descriptive project header. Dates are normalized at the load boundary:
/// absent or unparseable date strings become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(with = "flexible_date")]
    pub end_date: Option<NaiveDate>,
    pub manager: String,
    pub description: String,
}

/// Entry in the pre-rate-card `internalRates`/`externalRates` lists.
///
/// Preserved verbatim after migration; never edited again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub rate: f64,
}

/// The whole estimation document for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub project_info: ProjectInfo,
    pub contingency_percentage: f64,
    pub internal_resources: Vec<InternalResource>,
    pub vendor_costs: Vec<VendorCost>,
    pub tool_costs: Vec<ToolCost>,
    pub misc_costs: Vec<MiscCost>,
    pub risks: Vec<Risk>,
    pub rate_cards: Vec<RateCard>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub internal_rates: Vec<LegacyRate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_rates: Vec<LegacyRate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Project {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            project_info: ProjectInfo::default(),
            contingency_percentage: 0.0,
            internal_resources: Vec::new(),
            vendor_costs: Vec::new(),
            tool_costs: Vec::new(),
            misc_costs: Vec::new(),
            risks: Vec::new(),
            rate_cards: Vec::new(),
            internal_rates: Vec::new(),
            external_rates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let mut project = Self::default();
        project.project_info.name = name.into();
        project
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_info(&mut self, info: ProjectInfo) {
        self.project_info = info;
        self.touch();
    }

    pub fn set_contingency_percentage(&mut self, percentage: f64) -> Result<(), ProjectError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(ProjectError::Validation(format!(
                "contingency percentage must be between 0 and 100, got {percentage}"
            )));
        }
        self.contingency_percentage = percentage;
        self.touch();
        Ok(())
    }

    pub fn add_internal_resource(&mut self, resource: InternalResource) -> Result<String, ProjectError> {
        resource.validate()?;
        let id = resource.id.clone();
        self.internal_resources.push(resource);
        self.touch();
        Ok(id)
    }

    pub fn update_internal_resource(&mut self, resource: InternalResource) -> Result<(), ProjectError> {
        resource.validate()?;
        replace_by_id(&mut self.internal_resources, resource)?;
        self.touch();
        Ok(())
    }

    pub fn remove_internal_resource(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.internal_resources, id)
    }

    pub fn add_vendor_cost(&mut self, vendor: VendorCost) -> Result<String, ProjectError> {
        vendor.validate()?;
        let id = vendor.id.clone();
        self.vendor_costs.push(vendor);
        self.touch();
        Ok(id)
    }

    pub fn update_vendor_cost(&mut self, vendor: VendorCost) -> Result<(), ProjectError> {
        vendor.validate()?;
        replace_by_id(&mut self.vendor_costs, vendor)?;
        self.touch();
        Ok(())
    }

    pub fn remove_vendor_cost(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.vendor_costs, id)
    }

    pub fn add_tool_cost(&mut self, tool: ToolCost) -> Result<String, ProjectError> {
        tool.validate()?;
        let id = tool.id.clone();
        self.tool_costs.push(tool);
        self.touch();
        Ok(id)
    }

    pub fn update_tool_cost(&mut self, tool: ToolCost) -> Result<(), ProjectError> {
        tool.validate()?;
        replace_by_id(&mut self.tool_costs, tool)?;
        self.touch();
        Ok(())
    }

    pub fn remove_tool_cost(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.tool_costs, id)
    }

    pub fn add_misc_cost(&mut self, misc: MiscCost) -> Result<String, ProjectError> {
        misc.validate()?;
        let id = misc.id.clone();
        self.misc_costs.push(misc);
        self.touch();
        Ok(id)
    }

    pub fn update_misc_cost(&mut self, misc: MiscCost) -> Result<(), ProjectError> {
        misc.validate()?;
        replace_by_id(&mut self.misc_costs, misc)?;
        self.touch();
        Ok(())
    }

    pub fn remove_misc_cost(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.misc_costs, id)
    }

    pub fn add_risk(&mut self, risk: Risk) -> Result<String, ProjectError> {
        risk.validate()?;
        let id = risk.id.clone();
        self.risks.push(risk);
        self.touch();
        Ok(id)
    }

    pub fn update_risk(&mut self, risk: Risk) -> Result<(), ProjectError> {
        risk.validate()?;
        replace_by_id(&mut self.risks, risk)?;
        self.touch();
        Ok(())
    }

    pub fn remove_risk(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.risks, id)
    }

    /// Adds a rate card, rejecting a duplicate role within its category.
    pub fn add_rate_card(&mut self, card: RateCard) -> Result<String, ProjectError> {
        card.validate()?;
        self.ensure_unique_role(&card, None)?;
        let id = card.id.clone();
        self.rate_cards.push(card);
        self.touch();
        Ok(id)
    }

    pub fn update_rate_card(&mut self, card: RateCard) -> Result<(), ProjectError> {
        card.validate()?;
        self.ensure_unique_role(&card, Some(&card.id))?;
        replace_by_id(&mut self.rate_cards, card)?;
        self.touch();
        Ok(())
    }

    pub fn remove_rate_card(&mut self, id: &str) -> bool {
        self.remove_entry(|project| &mut project.rate_cards, id)
    }

    /// Resolves the daily rate for a role, 0.0 when no card matches.
    pub fn rate_for_role(&self, category: RateCategory, role: &str) -> f64 {
        rate_for_role(&self.rate_cards, category, role)
    }

    /// Mints a record id using the project's allocation scheme.
    pub fn allocate_id(&self) -> String {
        new_record_id()
    }

    /// Detects dangling references and other anomalies in the document.
    ///
    /// Loaded documents are accepted as-is, so duplicates or dangling
    /// roles already on disk surface here instead of failing the load.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for resource in &self.internal_resources {
            let known = self
                .rate_cards
                .iter()
                .any(|card| card.category == RateCategory::Internal && card.role == resource.role);
            if !known {
                warnings.push(format!(
                    "resource `{}` references unknown internal role `{}`",
                    resource.name, resource.role
                ));
            }
        }
        for (index, card) in self.rate_cards.iter().enumerate() {
            let duplicated = self.rate_cards[..index]
                .iter()
                .any(|other| other.category == card.category && other.role == card.role);
            if duplicated {
                warnings.push(format!(
                    "duplicate {} rate card for role `{}`",
                    card.category, card.role
                ));
            }
        }
        warnings
    }

    fn ensure_unique_role(&self, card: &RateCard, skip_id: Option<&str>) -> Result<(), ProjectError> {
        let clash = self.rate_cards.iter().any(|other| {
            other.category == card.category
                && other.role == card.role
                && skip_id != Some(other.id.as_str())
        });
        if clash {
            return Err(ProjectError::Validation(format!(
                "a {} rate card for role `{}` already exists",
                card.category, card.role
            )));
        }
        Ok(())
    }

    fn remove_entry<T: Identifiable>(
        &mut self,
        collection: impl FnOnce(&mut Self) -> &mut Vec<T>,
        id: &str,
    ) -> bool {
        let items = collection(self);
        let before = items.len();
        items.retain(|item| item.id() != id);
        let removed = items.len() != before;
        if removed {
            self.touch();
        }
        removed
    }
}

fn replace_by_id<T: Identifiable>(items: &mut [T], replacement: T) -> Result<(), ProjectError> {
    let id = replacement.id().to_string();
    match items.iter_mut().find(|item| item.id() == id) {
        Some(slot) => {
            *slot = replacement;
            Ok(())
        }
        None => Err(ProjectError::InvalidRef(format!("no record with id `{id}`"))),
    }
}

/// Serde adapter for the wire date format: `"YYYY-MM-DD"` or empty.
///
/// Deserialization is tolerant — anything that does not parse as a
/// calendar date becomes `None`, which downstream code treats as "use the
/// default timeline".
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    /// Parses a date out of a wire string, tolerating a trailing time part.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().or_else(|| {
            trimmed
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        })
    }
}
