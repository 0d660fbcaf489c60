//! Category time allocation
//!
//! Splits a total viewing budget across categories in proportion to their rule
//! weights, heaviest category first, and recommends a preset window for each.

use serde::Serialize;

use super::presets::SlotPreset;
use crate::categorizer::RuleSet;
use crate::error::{Error, Result};
use crate::models::Category;

/// Minutes allotted to one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAllocation {
    pub category: Category,
    pub minutes: u64,
    pub recommended_slot: &'static str,
    pub slot_description: &'static str,
}

/// Allocation of a whole budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAllocation {
    pub total_minutes: u64,
    pub allocated_minutes: u64,
    pub remaining_minutes: u64,
    pub allocations: Vec<CategoryAllocation>,
}

/// Allocate `available_minutes` across `categories`
///
/// Shares are floored, so a few minutes may stay unallocated. Categories with
/// equal weight keep the order they were given in.
pub fn allocate_time(
    available_minutes: u64,
    categories: &[Category],
    rules: &RuleSet,
) -> Result<TimeAllocation> {
    if categories.is_empty() {
        return Err(Error::config("no categories to allocate time to"));
    }

    let mut ordered: Vec<(Category, f64)> = Vec::with_capacity(categories.len());
    for category in categories {
        if !ordered.iter().any(|(c, _)| c == category) {
            ordered.push((*category, rules.weight_of(*category)));
        }
    }
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total_weight: f64 = ordered.iter().map(|(_, w)| w).sum();
    let count = ordered.len();

    let mut remaining = available_minutes;
    let mut allocations = Vec::with_capacity(ordered.len());
    for (category, weight) in ordered {
        let share = if total_weight > 0.0 {
            weight / total_weight
        } else {
            1.0 / count as f64
        };
        let minutes = ((share * available_minutes as f64).floor() as u64).min(remaining);
        remaining -= minutes;

        let preset = SlotPreset::recommended_for(category);
        allocations.push(CategoryAllocation {
            category,
            minutes,
            recommended_slot: preset.name,
            slot_description: preset.description,
        });
    }

    Ok(TimeAllocation {
        total_minutes: available_minutes,
        allocated_minutes: available_minutes - remaining,
        remaining_minutes: remaining,
        allocations,
    })
}
