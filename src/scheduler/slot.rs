//! Time slot definitions
//!
//! A [`TimeSlotSpec`] is the caller's request shape. It is resolved into a
//! validated [`TimeSlot`] with a concrete duration budget before packing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::models::Category;

/// Largest accepted slot budget (366 days)
pub const MAX_SLOT_BUDGET_SECONDS: u64 = 366 * 24 * 60 * 60;

/// Time slot as supplied in a scheduling request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotSpec {
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,

    /// Signed so that a negative budget can be rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_budget_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_categories: Option<Vec<Category>>,
}

/// Validated viewing window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,

    pub budget_seconds: u64,

    /// `None` admits every category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_categories: Option<BTreeSet<Category>>,
}

impl TimeSlot {
    /// Slot with a fixed budget and no category restriction
    pub fn new(label: impl Into<String>, budget_seconds: u64) -> Self {
        Self {
            label: label.into(),
            start: None,
            end: None,
            budget_seconds,
            allowed_categories: None,
        }
    }

    /// Restrict the slot to the given categories
    pub fn with_categories<I: IntoIterator<Item = Category>>(mut self, categories: I) -> Self {
        self.allowed_categories = Some(categories.into_iter().collect());
        self
    }

    /// Attach a calendar window
    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Resolve and validate a caller-supplied slot
    pub fn from_spec(spec: TimeSlotSpec) -> Result<Self> {
        let label = spec.label.trim().to_string();
        if label.is_empty() {
            return Err(Error::config("time slot with empty label"));
        }

        let window_seconds = match (spec.start, spec.end) {
            (Some(start), Some(end)) => {
                let secs = (end - start).num_seconds();
                if secs < 0 {
                    return Err(Error::config(format!(
                        "time slot '{label}' ends before it starts"
                    )));
                }
                Some(secs as u64)
            }
            (None, None) => None,
            _ => {
                return Err(Error::config(format!(
                    "time slot '{label}' needs both start and end"
                )));
            }
        };

        let budget_seconds = match (spec.duration_budget_seconds, window_seconds) {
            (Some(budget), _) if budget < 0 => {
                return Err(Error::config(format!(
                    "time slot '{label}' has negative budget {budget}"
                )));
            }
            (Some(budget), Some(window)) if budget as u64 > window => {
                return Err(Error::config(format!(
                    "time slot '{label}' budget {budget}s exceeds its {window}s window"
                )));
            }
            (Some(budget), _) => budget as u64,
            (None, Some(window)) => window,
            (None, None) => {
                return Err(Error::config(format!(
                    "time slot '{label}' has neither a budget nor a window"
                )));
            }
        };
        if budget_seconds > MAX_SLOT_BUDGET_SECONDS {
            return Err(Error::config(format!(
                "time slot '{label}' budget {budget_seconds}s exceeds the {MAX_SLOT_BUDGET_SECONDS}s limit"
            )));
        }

        let allowed_categories = match spec.allowed_categories {
            Some(categories) if categories.is_empty() => {
                return Err(Error::config(format!(
                    "time slot '{label}' allows no categories"
                )));
            }
            Some(categories) => Some(categories.into_iter().collect()),
            None => None,
        };

        Ok(Self {
            label,
            start: spec.start,
            end: spec.end,
            budget_seconds,
            allowed_categories,
        })
    }

    /// Check whether the slot admits a category
    pub fn permits(&self, category: Category) -> bool {
        self.allowed_categories
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&category))
    }
}

/// Resolve a whole slot list; an empty list is a configuration error
pub fn resolve_slots(specs: Vec<TimeSlotSpec>) -> Result<Vec<TimeSlot>> {
    if specs.is_empty() {
        return Err(Error::config("scheduling request has no time slots"));
    }
    let slots = specs
        .into_iter()
        .map(TimeSlot::from_spec)
        .collect::<Result<Vec<_>>>()?;
    ensure_unique_labels(&slots)?;
    Ok(slots)
}

/// Reject slot lists where two slots share a label
///
/// Labels identify slots in the schedule, document rows and calendar events.
pub fn ensure_unique_labels(slots: &[TimeSlot]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for slot in slots {
        if !seen.insert(slot.label.as_str()) {
            return Err(Error::config(format!(
                "duplicate time slot label '{}'",
                slot.label
            )));
        }
    }
    Ok(())
}
