//! Derivation of the month/year column axis from a project's date range.
//!
//! The timeline is computed, never persisted: any change to the project's
//! start or end date invalidates it and callers recompute from scratch.

use chrono::{Datelike, NaiveDate, Utc};

use crate::domain::line_items::MAX_MONTHS;

/// Number of generic columns when no usable date range exists.
pub const DEFAULT_MONTH_COUNT: u32 = 4;

/// One column of the time axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthColumn {
    /// Display label: a short month name ("Jan"), or "Month N" on the
    /// default timeline.
    pub label: String,
    pub year: i32,
    /// Stable logical key, "month1".."monthN".
    pub key: String,
}

/// Consecutive run of months sharing a calendar year; `month_count` is the
/// column span of the year header cell above them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup {
    pub year: i32,
    pub month_count: usize,
}

/// The derived column axis for time-series line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub months: Vec<MonthColumn>,
    pub year_groups: Vec<YearGroup>,
}

impl Timeline {
    pub fn month_keys(&self) -> Vec<&str> {
        self.months.iter().map(|month| month.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// 1-based month indexes, the iteration axis for aggregation.
    pub fn month_indexes(&self) -> impl Iterator<Item = u32> + '_ {
        1..=self.months.len() as u32
    }
}

/// Computes the timeline for a date range against today's date.
pub fn compute_timeline(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Timeline {
    compute_timeline_at(start, end, Utc::now().date_naive())
}

/// Computes the timeline with an explicit reference date supplying the
/// fallback year. Pure and deterministic in its three inputs.
pub fn compute_timeline_at(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    reference: NaiveDate,
) -> Timeline {
    let (Some(start), Some(end)) = (start, end) else {
        return default_timeline(reference.year());
    };

    let mut months = Vec::new();
    // Walking first-of-month keeps the inclusion rule simple: a month is
    // in range exactly when its first day is <= the end date.
    let mut current = first_of_month(start);
    while current <= end && months.len() < MAX_MONTHS as usize {
        months.push(MonthColumn {
            label: current.format("%b").to_string(),
            year: current.year(),
            key: format!("month{}", months.len() + 1),
        });
        current = next_month(current);
    }

    if months.is_empty() {
        // Inverted ranges produce nothing; degrade to one generic column.
        return generic_timeline(1, reference.year());
    }

    let year_groups = group_by_year(&months);
    Timeline { months, year_groups }
}

fn default_timeline(year: i32) -> Timeline {
    generic_timeline(DEFAULT_MONTH_COUNT, year)
}

fn generic_timeline(month_count: u32, year: i32) -> Timeline {
    let months = (1..=month_count)
        .map(|index| MonthColumn {
            label: format!("Month {index}"),
            year,
            key: format!("month{index}"),
        })
        .collect::<Vec<_>>();
    let year_groups = vec![YearGroup {
        year,
        month_count: months.len(),
    }];
    Timeline { months, year_groups }
}

fn group_by_year(months: &[MonthColumn]) -> Vec<YearGroup> {
    let mut groups: Vec<YearGroup> = Vec::new();
    for month in months {
        match groups.last_mut() {
            Some(group) if group.year == month.year => group.month_count += 1,
            _ => groups.push(YearGroup {
                year: month.year,
                month_count: 1,
            }),
        }
    }
    groups
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}
