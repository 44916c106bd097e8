//! Aggregation of resolved line-item values into category and project
//! totals.
//!
//! All money math stays in f64; rounding is a presentation concern and
//! happens only when a report is rendered.

use serde::{Deserialize, Serialize};

use crate::core::resolve::resolve_month_value;
use crate::core::timeline::Timeline;
use crate::domain::line_items::{InternalResource, MiscCost, Risk, ToolCost, VendorCost};
use crate::domain::project::Project;
use crate::domain::rate_card::{rate_for_role, RateCard, RateCategory};

/// Totals of the four money categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub internal: f64,
    pub vendor: f64,
    pub tool: f64,
    pub misc: f64,
}

impl CategoryTotals {
    pub fn subtotal(&self) -> f64 {
        self.internal + self.vendor + self.tool + self.misc
    }
}

/// Subtotal, contingency buffer, and grand total for a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub subtotal: f64,
    pub contingency: f64,
    pub total: f64,
}

/// Everything the summary/forecast views need in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub categories: CategoryTotals,
    pub contingency_percentage: f64,
    pub totals: ProjectTotals,
}

/// Per-month internal staffing cost: resolved days times the daily rate of
/// the referenced internal rate card (0 for dangling roles).
pub fn internal_per_month_totals(
    resources: &[InternalResource],
    timeline: &Timeline,
    rate_cards: &[RateCard],
) -> Vec<f64> {
    timeline
        .month_indexes()
        .map(|index| {
            resources
                .iter()
                .map(|resource| {
                    let rate = rate_for_role(rate_cards, RateCategory::Internal, &resource.role);
                    resolve_month_value(&resource.days, index) * rate
                })
                .sum()
        })
        .collect()
}

/// Per-month vendor spend, resolved directly in money.
pub fn vendor_per_month_totals(vendors: &[VendorCost], timeline: &Timeline) -> Vec<f64> {
    timeline
        .month_indexes()
        .map(|index| {
            vendors
                .iter()
                .map(|vendor| resolve_month_value(&vendor.costs, index))
                .sum()
        })
        .collect()
}

/// Sums a per-month total row over the whole timeline.
pub fn category_total(per_month: &[f64]) -> f64 {
    per_month.iter().sum()
}

/// Tool licensing is flat: seats times monthly price times duration, not
/// spread across the per-month grid.
pub fn tool_cost_total(tool: &ToolCost) -> f64 {
    tool.users as f64 * tool.monthly_cost * tool.duration_months as f64
}

pub fn tools_total(tools: &[ToolCost]) -> f64 {
    tools.iter().map(tool_cost_total).sum()
}

/// Flat sum of one-off costs, no time dimension.
pub fn misc_total(items: &[MiscCost]) -> f64 {
    items.iter().map(|item| item.cost).sum()
}

/// Display-only risk score. Stored values are multiplied as-is; range
/// enforcement happens at the validation boundary, never here.
pub fn risk_score(risk: &Risk) -> u32 {
    risk.probability * risk.impact
}

/// Applies the contingency buffer to the category subtotal.
pub fn project_totals(categories: &CategoryTotals, contingency_percentage: f64) -> ProjectTotals {
    let subtotal = categories.subtotal();
    let contingency = subtotal * contingency_percentage / 100.0;
    ProjectTotals {
        subtotal,
        contingency,
        total: subtotal + contingency,
    }
}

/// Computes the full summary for a project against a timeline.
pub fn summarize(project: &Project, timeline: &Timeline) -> ProjectSummary {
    let categories = CategoryTotals {
        internal: category_total(&internal_per_month_totals(
            &project.internal_resources,
            timeline,
            &project.rate_cards,
        )),
        vendor: category_total(&vendor_per_month_totals(&project.vendor_costs, timeline)),
        tool: tools_total(&project.tool_costs),
        misc: misc_total(&project.misc_costs),
    };
    let totals = project_totals(&categories, project.contingency_percentage);
    ProjectSummary {
        categories,
        contingency_percentage: project.contingency_percentage,
        totals,
    }
}
