//! Line-item records and their schema-tolerant wire representation.
//!
//! Persisted documents keep per-month values as flat record fields
//! (`month3Days`, `q1Cost`, ...). Two generations of that layout coexist:
//! the current monthly keys and the older quarterly buckets. On load both
//! are captured into a [`MonthSeries`] so the rest of the crate only sees
//! one canonical shape; the precedence rules live in `core::resolve`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{new_record_id, Identifiable};
use crate::errors::ProjectError;

/// Upper bound on the timeline length, and therefore on monthly keys.
pub const MAX_MONTHS: u32 = 24;

/// Number of legacy quarterly buckets.
pub const QUARTER_COUNT: u32 = 4;

/// Per-month metric vector for a time-series line item.
///
/// Both schema generations are retained side by side and never merged, so
/// a monthly entry can shadow its quarter without double-counting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthSeries {
    monthly: BTreeMap<u32, f64>,
    quarterly: BTreeMap<u32, f64>,
}

impl MonthSeries {
    /// Sets the value for a 1-based month index. Out-of-range indexes are
    /// ignored rather than stored.
    pub fn set_month(&mut self, index: u32, value: f64) {
        if (1..=MAX_MONTHS).contains(&index) {
            self.monthly.insert(index, value);
        }
    }

    /// Sets the value for a legacy 1-based quarter bucket.
    pub fn set_quarter(&mut self, index: u32, value: f64) {
        if (1..=QUARTER_COUNT).contains(&index) {
            self.quarterly.insert(index, value);
        }
    }

    /// Returns the monthly entry for an index, if one is present.
    ///
    /// Presence is meaningful here: an explicit 0.0 is a stored value, not
    /// an absence.
    pub fn month(&self, index: u32) -> Option<f64> {
        self.monthly.get(&index).copied()
    }

    /// Returns the legacy quarterly entry for a bucket, if one is present.
    pub fn quarter(&self, index: u32) -> Option<f64> {
        self.quarterly.get(&index).copied()
    }

    pub fn months(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.monthly.iter().map(|(index, value)| (*index, *value))
    }

    pub fn quarters(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.quarterly.iter().map(|(index, value)| (*index, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty() && self.quarterly.is_empty()
    }

    fn has_negative(&self) -> bool {
        self.monthly.values().chain(self.quarterly.values()).any(|value| *value < 0.0)
    }
}

/// Parses a month-series out of a record's flattened extra fields.
///
/// Accepts JSON numbers and numeric strings; anything else is skipped.
fn parse_series(fields: &BTreeMap<String, Value>, suffix: &str) -> MonthSeries {
    let mut series = MonthSeries::default();
    for (key, value) in fields {
        let Some(stem) = key.strip_suffix(suffix) else {
            continue;
        };
        let Some(number) = numeric_value(value) else {
            continue;
        };
        if let Some(index) = stem.strip_prefix("month").and_then(|raw| raw.parse::<u32>().ok()) {
            series.set_month(index, number);
        } else if let Some(index) = stem.strip_prefix('q').and_then(|raw| raw.parse::<u32>().ok()) {
            series.set_quarter(index, number);
        }
    }
    series
}

fn emit_series(series: &MonthSeries, suffix: &str, fields: &mut BTreeMap<String, Value>) {
    for (index, value) in series.months() {
        fields.insert(format!("month{index}{suffix}"), Value::from(value));
    }
    for (index, value) in series.quarters() {
        fields.insert(format!("q{index}{suffix}"), Value::from(value));
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn require_text(value: &str, what: &str) -> Result<(), ProjectError> {
    if value.trim().is_empty() {
        Err(ProjectError::Validation(format!("{what} is required")))
    } else {
        Ok(())
    }
}

/// Staff assignment billed as days per month against an internal rate card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInternalResource", into = "RawInternalResource")]
pub struct InternalResource {
    pub id: String,
    pub role: String,
    pub name: String,
    pub notes: String,
    pub days: MonthSeries,
}

impl InternalResource {
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            role: role.into(),
            name: name.into(),
            notes: String::new(),
            days: MonthSeries::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        require_text(&self.role, "resource role")?;
        if self.days.has_negative() {
            return Err(ProjectError::Validation(format!(
                "resource `{}` has negative staff-days",
                self.role
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInternalResource {
    #[serde(default = "new_record_id")]
    id: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    notes: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl From<RawInternalResource> for InternalResource {
    fn from(raw: RawInternalResource) -> Self {
        let days = parse_series(&raw.fields, "Days");
        Self {
            id: raw.id,
            role: raw.role,
            name: raw.name,
            notes: raw.notes,
            days,
        }
    }
}

impl From<InternalResource> for RawInternalResource {
    fn from(resource: InternalResource) -> Self {
        let mut fields = BTreeMap::new();
        emit_series(&resource.days, "Days", &mut fields);
        Self {
            id: resource.id,
            role: resource.role,
            name: resource.name,
            notes: resource.notes,
            fields,
        }
    }
}

/// Externally invoiced cost tracked directly in money per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVendorCost", into = "RawVendorCost")]
pub struct VendorCost {
    pub id: String,
    pub vendor: String,
    pub description: String,
    pub costs: MonthSeries,
}

impl VendorCost {
    pub fn new(vendor: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_record_id(),
            vendor: vendor.into(),
            description: description.into(),
            costs: MonthSeries::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        require_text(&self.vendor, "vendor name")?;
        if self.costs.has_negative() {
            return Err(ProjectError::Validation(format!(
                "vendor `{}` has negative costs",
                self.vendor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVendorCost {
    #[serde(default = "new_record_id")]
    id: String,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    description: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl From<RawVendorCost> for VendorCost {
    fn from(raw: RawVendorCost) -> Self {
        let costs = parse_series(&raw.fields, "Cost");
        Self {
            id: raw.id,
            vendor: raw.vendor,
            description: raw.description,
            costs,
        }
    }
}

impl From<VendorCost> for RawVendorCost {
    fn from(vendor: VendorCost) -> Self {
        let mut fields = BTreeMap::new();
        emit_series(&vendor.costs, "Cost", &mut fields);
        Self {
            id: vendor.id,
            vendor: vendor.vendor,
            description: vendor.description,
            fields,
        }
    }
}

/// License or tooling cost, flat across the project duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCost {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub users: u32,
    #[serde(default)]
    pub monthly_cost: f64,
    #[serde(default)]
    pub duration_months: u32,
}

impl ToolCost {
    pub fn new(name: impl Into<String>, users: u32, monthly_cost: f64, duration_months: u32) -> Self {
        Self {
            id: new_record_id(),
            name: name.into(),
            users,
            monthly_cost,
            duration_months,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        require_text(&self.name, "tool name")?;
        if self.monthly_cost < 0.0 {
            return Err(ProjectError::Validation(format!(
                "tool `{}` has a negative monthly cost",
                self.name
            )));
        }
        Ok(())
    }
}

/// One-off cost with no time dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscCost {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: f64,
}

impl MiscCost {
    pub fn new(description: impl Into<String>, cost: f64) -> Self {
        Self {
            id: new_record_id(),
            description: description.into(),
            cost,
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        require_text(&self.description, "cost description")?;
        if self.cost < 0.0 {
            return Err(ProjectError::Validation(format!(
                "misc cost `{}` must not be negative",
                self.description
            )));
        }
        Ok(())
    }
}

/// Identified project risk scored by probability and impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(default = "new_record_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub probability: u32,
    #[serde(default)]
    pub impact: u32,
    #[serde(default)]
    pub mitigation: String,
}

impl Risk {
    pub fn new(description: impl Into<String>, probability: u32, impact: u32) -> Self {
        Self {
            id: new_record_id(),
            description: description.into(),
            probability,
            impact,
            mitigation: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        require_text(&self.description, "risk description")?;
        for (value, what) in [(self.probability, "probability"), (self.impact, "impact")] {
            if !(1..=5).contains(&value) {
                return Err(ProjectError::Validation(format!(
                    "risk {what} must be between 1 and 5, got {value}"
                )));
            }
        }
        Ok(())
    }
}

macro_rules! impl_identifiable {
    ($($ty:ty),+) => {
        $(impl Identifiable for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

impl_identifiable!(InternalResource, VendorCost, ToolCost, MiscCost, Risk);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_fields_parse_from_wire() {
        let raw = serde_json::json!({
            "id": "r-1",
            "role": "Dev",
            "month1Days": 10,
            "month2Days": 0,
            "month3Days": "7.5",
            "q1Days": 99
        });
        let resource: InternalResource = serde_json::from_value(raw).expect("parse resource");
        assert_eq!(resource.days.month(1), Some(10.0));
        assert_eq!(resource.days.month(2), Some(0.0));
        assert_eq!(resource.days.month(3), Some(7.5));
        assert_eq!(resource.days.quarter(1), Some(99.0));
    }

    #[test]
    fn out_of_range_month_keys_are_ignored() {
        let raw = serde_json::json!({
            "id": "r-2",
            "role": "Dev",
            "month25Days": 4,
            "q5Days": 4,
            "month0Days": 4
        });
        let resource: InternalResource = serde_json::from_value(raw).expect("parse resource");
        assert!(resource.days.is_empty());
    }

    #[test]
    fn vendor_series_round_trips_both_generations() {
        let raw = serde_json::json!({
            "id": "v-1",
            "vendor": "Acme",
            "description": "Integration work",
            "month2Cost": 1500.0,
            "q1Cost": 300.0
        });
        let vendor: VendorCost = serde_json::from_value(raw).expect("parse vendor");
        let value = serde_json::to_value(&vendor).expect("serialize vendor");
        let reparsed: VendorCost = serde_json::from_value(value).expect("reparse vendor");
        assert_eq!(vendor, reparsed);
    }

    #[test]
    fn missing_record_id_gets_allocated() {
        let raw = serde_json::json!({ "description": "Courier", "cost": 40.0 });
        let misc: MiscCost = serde_json::from_value(raw).expect("parse misc cost");
        assert!(!misc.id.is_empty());
    }

    #[test]
    fn risk_scores_outside_range_fail_validation() {
        let risk = Risk::new("Key person leaves", 6, 3);
        assert!(risk.validate().is_err());
        let risk = Risk::new("Key person leaves", 3, 3);
        assert!(risk.validate().is_ok());
    }

    #[test]
    fn negative_month_values_fail_validation() {
        let mut resource = InternalResource::new("Dev", "");
        resource.days.set_month(1, -2.0);
        assert!(resource.validate().is_err());
    }
}
