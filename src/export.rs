//! Plain-text report projection of a project document.
//!
//! Rendering is a pure function of the document and its derived timeline;
//! it never feeds data back into the model. Money is formatted to two
//! decimals here and nowhere earlier.

use crate::core::aggregate::{
    internal_per_month_totals, misc_total, risk_score, summarize, tool_cost_total,
    vendor_per_month_totals,
};
use crate::core::timeline::Timeline;
use crate::domain::project::Project;

const LABEL_WIDTH: usize = 22;
const MONTH_WIDTH: usize = 10;
const TOTAL_WIDTH: usize = 12;

/// Renders the sectioned report: project info, rate cards, every line-item
/// section with a totals row, and the closing summary block.
pub fn render_report(project: &Project, timeline: &Timeline) -> String {
    let mut out = String::new();
    push_heading(&mut out, "PROJECT COST ESTIMATE", '=');
    push_info(&mut out, project);
    push_rate_cards(&mut out, project);
    push_internal_resources(&mut out, project, timeline);
    push_vendor_costs(&mut out, project, timeline);
    push_tool_costs(&mut out, project);
    push_misc_costs(&mut out, project);
    push_risks(&mut out, project);
    push_summary(&mut out, project, timeline);
    out
}

fn push_heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&underline.to_string().repeat(title.len()));
    out.push_str("\n\n");
}

fn push_info(out: &mut String, project: &Project) {
    let info = &project.project_info;
    out.push_str(&format!("Project:     {}\n", info.name));
    out.push_str(&format!("Manager:     {}\n", info.manager));
    out.push_str(&format!("Start date:  {}\n", format_date(info.start_date)));
    out.push_str(&format!("End date:    {}\n", format_date(info.end_date)));
    if !info.description.trim().is_empty() {
        out.push_str(&format!("Description: {}\n", info.description));
    }
    out.push('\n');
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into())
}

fn push_rate_cards(out: &mut String, project: &Project) {
    push_heading(out, "RATE CARDS", '-');
    out.push_str(&format!(
        "{:<10}{:<width$}{:>total$}\n",
        "Category",
        "Role",
        "Daily rate",
        width = LABEL_WIDTH,
        total = TOTAL_WIDTH
    ));
    for card in &project.rate_cards {
        out.push_str(&format!(
            "{:<10}{:<width$}{:>total$.2}\n",
            card.category.to_string(),
            card.role,
            card.rate,
            width = LABEL_WIDTH,
            total = TOTAL_WIDTH
        ));
    }
    out.push('\n');
}

/// Two-row header: the year row spans its months via the year-group
/// column counts, the month row carries the individual labels.
fn push_time_header(out: &mut String, timeline: &Timeline) {
    let mut year_row = format!("{:<width$}", "", width = LABEL_WIDTH);
    for group in &timeline.year_groups {
        let span = group.month_count * MONTH_WIDTH;
        year_row.push_str(&format!("{:^span$}", group.year, span = span));
    }
    year_row.push_str(&format!("{:>width$}", "", width = TOTAL_WIDTH));
    out.push_str(year_row.trim_end());
    out.push('\n');

    let mut month_row = format!("{:<width$}", "", width = LABEL_WIDTH);
    for month in &timeline.months {
        month_row.push_str(&format!("{:>width$}", month.label, width = MONTH_WIDTH));
    }
    month_row.push_str(&format!("{:>width$}", "Total", width = TOTAL_WIDTH));
    out.push_str(&month_row);
    out.push('\n');
}

fn push_series_rows(out: &mut String, rows: &[(String, Vec<f64>)], per_month_totals: &[f64]) {
    for (label, values) in rows {
        let total: f64 = values.iter().sum();
        out.push_str(&format!("{:<width$}", label, width = LABEL_WIDTH));
        for value in values {
            out.push_str(&format!("{:>width$.2}", value, width = MONTH_WIDTH));
        }
        out.push_str(&format!("{:>width$.2}\n", total, width = TOTAL_WIDTH));
    }
    let total: f64 = per_month_totals.iter().sum();
    out.push_str(&format!("{:<width$}", "TOTAL", width = LABEL_WIDTH));
    for value in per_month_totals {
        out.push_str(&format!("{:>width$.2}", value, width = MONTH_WIDTH));
    }
    out.push_str(&format!("{:>width$.2}\n", total, width = TOTAL_WIDTH));
}

fn push_internal_resources(out: &mut String, project: &Project, timeline: &Timeline) {
    push_heading(out, "INTERNAL RESOURCES", '-');
    push_time_header(out, timeline);
    let rows: Vec<(String, Vec<f64>)> = project
        .internal_resources
        .iter()
        .map(|resource| {
            let label = if resource.name.trim().is_empty() {
                resource.role.clone()
            } else {
                format!("{} ({})", resource.role, resource.name)
            };
            let values = internal_per_month_totals(
                std::slice::from_ref(resource),
                timeline,
                &project.rate_cards,
            );
            (label, values)
        })
        .collect();
    let totals =
        internal_per_month_totals(&project.internal_resources, timeline, &project.rate_cards);
    push_series_rows(out, &rows, &totals);
    out.push('\n');
}

fn push_vendor_costs(out: &mut String, project: &Project, timeline: &Timeline) {
    push_heading(out, "VENDOR COSTS", '-');
    push_time_header(out, timeline);
    let rows: Vec<(String, Vec<f64>)> = project
        .vendor_costs
        .iter()
        .map(|vendor| {
            let values = vendor_per_month_totals(std::slice::from_ref(vendor), timeline);
            (vendor.vendor.clone(), values)
        })
        .collect();
    let totals = vendor_per_month_totals(&project.vendor_costs, timeline);
    push_series_rows(out, &rows, &totals);
    out.push('\n');
}

fn push_tool_costs(out: &mut String, project: &Project) {
    push_heading(out, "TOOL COSTS", '-');
    out.push_str(&format!(
        "{:<width$}{:>8}{:>14}{:>8}{:>total$}\n",
        "Tool",
        "Users",
        "Monthly cost",
        "Months",
        "Total",
        width = LABEL_WIDTH,
        total = TOTAL_WIDTH
    ));
    for tool in &project.tool_costs {
        out.push_str(&format!(
            "{:<width$}{:>8}{:>14.2}{:>8}{:>total$.2}\n",
            tool.name,
            tool.users,
            tool.monthly_cost,
            tool.duration_months,
            tool_cost_total(tool),
            width = LABEL_WIDTH,
            total = TOTAL_WIDTH
        ));
    }
    let total: f64 = project.tool_costs.iter().map(tool_cost_total).sum();
    out.push_str(&format!(
        "{:<width$}{:>pad$.2}\n\n",
        "TOTAL",
        total,
        width = LABEL_WIDTH,
        pad = 30 + TOTAL_WIDTH
    ));
}

fn push_misc_costs(out: &mut String, project: &Project) {
    push_heading(out, "MISC COSTS", '-');
    out.push_str(&format!(
        "{:<width$}{:>total$}\n",
        "Description",
        "Cost",
        width = LABEL_WIDTH + 16,
        total = TOTAL_WIDTH
    ));
    for misc in &project.misc_costs {
        out.push_str(&format!(
            "{:<width$}{:>total$.2}\n",
            misc.description,
            misc.cost,
            width = LABEL_WIDTH + 16,
            total = TOTAL_WIDTH
        ));
    }
    out.push_str(&format!(
        "{:<width$}{:>total$.2}\n\n",
        "TOTAL",
        misc_total(&project.misc_costs),
        width = LABEL_WIDTH + 16,
        total = TOTAL_WIDTH
    ));
}

fn push_risks(out: &mut String, project: &Project) {
    push_heading(out, "RISKS", '-');
    out.push_str(&format!(
        "{:<width$}{:>6}{:>8}{:>7}\n",
        "Description",
        "Prob",
        "Impact",
        "Score",
        width = LABEL_WIDTH + 16
    ));
    for risk in &project.risks {
        out.push_str(&format!(
            "{:<width$}{:>6}{:>8}{:>7}\n",
            risk.description,
            risk.probability,
            risk.impact,
            risk_score(risk),
            width = LABEL_WIDTH + 16
        ));
    }
    out.push('\n');
}

fn push_summary(out: &mut String, project: &Project, timeline: &Timeline) {
    let summary = summarize(project, timeline);
    push_heading(out, "SUMMARY", '-');
    let row = |label: &str, value: f64| {
        format!("{:<width$}{:>total$.2}\n", label, value, width = LABEL_WIDTH, total = TOTAL_WIDTH)
    };
    out.push_str(&row("Internal resources", summary.categories.internal));
    out.push_str(&row("Vendor costs", summary.categories.vendor));
    out.push_str(&row("Tool costs", summary.categories.tool));
    out.push_str(&row("Misc costs", summary.categories.misc));
    out.push_str(&row("Subtotal", summary.totals.subtotal));
    out.push_str(&row(
        &format!("Contingency ({}%)", summary.contingency_percentage),
        summary.totals.contingency,
    ));
    out.push_str(&row("Grand total", summary.totals.total));
}
