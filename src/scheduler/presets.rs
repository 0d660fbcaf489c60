//! Named viewing-window presets
//!
//! Presets describe typical viewing windows (weekday evening, weekend morning,
//! ...) together with the categories that suit them and a focus duration.
//! They let a caller ask for `["weekday-evening", "weekend-morning"]` instead
//! of spelling out budgets.

use serde::Serialize;

use super::slot::{ensure_unique_labels, TimeSlot};
use crate::error::{Error, Result};
use crate::models::Category;

/// Attention level expected during a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

/// A named viewing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotPreset {
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static [Category],
    pub energy_level: EnergyLevel,
    pub focus_minutes: u64,
}

const PRESETS: &[SlotPreset] = &[
    SlotPreset {
        name: "weekday-morning",
        description: "Weekday mornings (7-9 AM)",
        best_for: &[Category::Short, Category::Productivity],
        energy_level: EnergyLevel::High,
        focus_minutes: 30,
    },
    SlotPreset {
        name: "weekday-evening",
        description: "Weekday evenings (6-9 PM)",
        best_for: &[Category::Education, Category::Tech, Category::Conference],
        energy_level: EnergyLevel::Medium,
        focus_minutes: 60,
    },
    SlotPreset {
        name: "weekend-morning",
        description: "Weekend mornings (9-12 AM)",
        best_for: &[
            Category::Education,
            Category::Tutorial,
            Category::Long,
            Category::Conference,
        ],
        energy_level: EnergyLevel::High,
        focus_minutes: 120,
    },
    SlotPreset {
        name: "weekend-afternoon",
        description: "Weekend afternoons (2-5 PM)",
        best_for: &[Category::Entertainment, Category::Tech, Category::Tutorial],
        energy_level: EnergyLevel::Medium,
        focus_minutes: 90,
    },
    SlotPreset {
        name: "weekend-evening",
        description: "Weekend evenings (7-10 PM)",
        best_for: &[Category::Entertainment, Category::Long, Category::Uncategorized],
        energy_level: EnergyLevel::Low,
        focus_minutes: 120,
    },
];

/// Preset recommended for categories no preset lists
pub const DEFAULT_PRESET: &str = "weekend-afternoon";

impl SlotPreset {
    /// All presets in declaration order
    pub fn all() -> &'static [SlotPreset] {
        PRESETS
    }

    /// Look up a preset by name (case-insensitive)
    pub fn find(name: &str) -> Result<&'static SlotPreset> {
        let wanted = name.trim().to_lowercase();
        PRESETS.iter().find(|p| p.name == wanted).ok_or_else(|| {
            let known: Vec<_> = PRESETS.iter().map(|p| p.name).collect();
            Error::config(format!(
                "unknown time slot preset '{name}'. Valid options: {}",
                known.join(", ")
            ))
        })
    }

    /// First preset that lists the category, or the default preset
    pub fn recommended_for(category: Category) -> &'static SlotPreset {
        PRESETS
            .iter()
            .find(|p| p.best_for.contains(&category))
            .or_else(|| PRESETS.iter().find(|p| p.name == DEFAULT_PRESET))
            .unwrap_or(&PRESETS[0])
    }

    /// Build a slot from the preset
    ///
    /// The budget is the preset's focus duration capped by
    /// `duration_limit_minutes`. An empty `categories` list falls back to the
    /// preset's own `best_for` list.
    pub fn to_slot(&self, duration_limit_minutes: u64, categories: &[Category]) -> TimeSlot {
        let minutes = self.focus_minutes.min(duration_limit_minutes);
        let allowed: Vec<Category> = if categories.is_empty() {
            self.best_for.to_vec()
        } else {
            categories.to_vec()
        };
        TimeSlot::new(self.name, minutes * 60).with_categories(allowed)
    }
}

impl TimeSlot {
    /// Slot from a named preset, see [`SlotPreset::to_slot`]
    pub fn from_preset(
        name: &str,
        duration_limit_minutes: u64,
        categories: &[Category],
    ) -> Result<Self> {
        Ok(SlotPreset::find(name)?.to_slot(duration_limit_minutes, categories))
    }
}

/// Session length cap applied to presets unless the caller sets one
pub const DEFAULT_PRESET_LIMIT_MINUTES: u64 = 120;

/// Build slots from preset names, in the order given
///
/// `categories` restricts every session; when empty each preset keeps its
/// own `best_for` list. A preset named twice is a configuration error.
pub fn slots_from_presets(
    names: &[String],
    categories: &[Category],
    duration_limit_minutes: u64,
) -> Result<Vec<TimeSlot>> {
    if names.is_empty() {
        return Err(Error::config("scheduling request has no time slots"));
    }
    if duration_limit_minutes == 0 {
        return Err(Error::config("preset duration limit must be at least one minute"));
    }
    let slots = names
        .iter()
        .map(|name| TimeSlot::from_preset(name, duration_limit_minutes, categories))
        .collect::<Result<Vec<_>>>()?;
    ensure_unique_labels(&slots)?;
    Ok(slots)
}
