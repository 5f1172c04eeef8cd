use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::category::Category;
use crate::records::group::GroupedCall;
use crate::records::{CallRecord, CategoryPalette};

use super::StageFilters;

/// Per-category tally for the outcome cards. `count`/`percentage` are over
/// the FULL unfiltered set so toggling an outcome filter doesn't move the
/// displayed base percentages; `count_in_filtered` is tracked separately
/// and never substituted for `count`.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub label: &'static str,
    pub count: usize,
    pub count_in_filtered: usize,
    pub percentage: u32,
    pub color: String,
}

/// Round-half-up percentage, 0 when the denominator is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// One Outcome per taxonomy label, in display order.
pub fn outcome_summary(
    all: &[CallRecord],
    filtered: &[CallRecord],
    palette: &CategoryPalette,
) -> Vec<Outcome> {
    Category::ALL
        .iter()
        .map(|&cat| {
            let count = all.iter().filter(|r| r.category == cat).count();
            let count_in_filtered = filtered.iter().filter(|r| r.category == cat).count();
            Outcome {
                label: cat.label(),
                count,
                count_in_filtered,
                percentage: percentage(count, all.len()),
                color: palette.color_for(cat),
            }
        })
        .collect()
}

/// Category tally within one stage of the grouped admin view, sorted by
/// category name. Percentages are relative to the records that reached
/// that stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageCategoryStat {
    pub name: String,
    pub count: usize,
    pub percentage: u32,
    /// Display color for the raw category name; unknown names get the
    /// neutral gray.
    pub color: String,
}

pub fn stage_category_stats(
    calls: &[GroupedCall],
    stage: i64,
    palette: &CategoryPalette,
) -> Vec<StageCategoryStat> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total = 0usize;
    for call in calls {
        let Some(entry) = call.stage(stage) else { continue };
        if entry.category.is_empty() {
            continue;
        }
        *counts.entry(entry.category.as_str()).or_default() += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| StageCategoryStat {
            name: name.to_string(),
            count,
            percentage: percentage(count, total),
            color: palette.color_for_raw(name),
        })
        .collect()
}

/// Share of all grouped calls matching the active stage filters. 100 when
/// no filter is selected.
pub fn selected_filters_percentage(calls: &[GroupedCall], filters: &StageFilters) -> u32 {
    if calls.is_empty() {
        return 0;
    }
    if filters.is_empty() {
        return 100;
    }
    let matching = calls.iter().filter(|c| filters.matches(c)).count();
    percentage(matching, calls.len())
}
