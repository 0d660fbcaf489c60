//! Schedule data structures
//!
//! A [`Schedule`] is produced fresh by every packing pass and never mutated
//! afterwards.

use serde::Serialize;
use std::collections::BTreeMap;

use super::slot::TimeSlot;
use crate::error::Result;
use crate::models::{Category, VideoRecord};

// ============================================================================
// Slot Assignment
// ============================================================================

/// Videos placed into one slot, in admission order
#[derive(Debug, Clone, Serialize)]
pub struct SlotAssignment {
    pub slot: TimeSlot,
    pub videos: Vec<VideoRecord>,
    pub used_seconds: u64,
    pub remaining_seconds: u64,
}

impl SlotAssignment {
    pub(crate) fn new(slot: TimeSlot) -> Self {
        let remaining_seconds = slot.budget_seconds;
        Self {
            slot,
            videos: Vec::new(),
            used_seconds: 0,
            remaining_seconds,
        }
    }

    pub(crate) fn admit(&mut self, video: VideoRecord, duration: u64) {
        self.used_seconds += duration;
        self.remaining_seconds -= duration;
        self.videos.push(video);
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Identifiers of the admitted videos
    pub fn video_ids(&self) -> Vec<&str> {
        self.videos.iter().map(|v| v.id.as_str()).collect()
    }
}

// ============================================================================
// Unscheduled
// ============================================================================

/// Why a video did not make it into any slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Longer than the largest slot budget; needs splitting or excluding
    ExceedsEverySlot,
    /// No slot admits the video's category
    CategoryNotPermitted,
    /// Every slot admitting the category is smaller than the video
    NoFittingSlot,
    /// A slot could have held it but was filled by higher ranked videos
    CapacityExhausted,
}

impl UnscheduledReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExceedsEverySlot => "exceeds_every_slot",
            Self::CategoryNotPermitted => "category_not_permitted",
            Self::NoFittingSlot => "no_fitting_slot",
            Self::CapacityExhausted => "capacity_exhausted",
        }
    }
}

/// A video left over after packing
#[derive(Debug, Clone, Serialize)]
pub struct UnscheduledVideo {
    pub video: VideoRecord,
    pub reason: UnscheduledReason,
}

// ============================================================================
// Schedule
// ============================================================================

/// Output of one scheduling pass
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    /// One entry per input slot, in input order
    pub assignments: Vec<SlotAssignment>,

    /// Leftover videos in queue order
    pub unscheduled: Vec<UnscheduledVideo>,

    pub total_scheduled_seconds: u64,
}

impl Schedule {
    /// Number of videos placed into slots
    pub fn scheduled_count(&self) -> usize {
        self.assignments.iter().map(|a| a.videos.len()).sum()
    }

    /// All scheduled videos, slot by slot
    pub fn scheduled(&self) -> impl Iterator<Item = &VideoRecord> {
        self.assignments.iter().flat_map(|a| a.videos.iter())
    }

    /// Videos longer than every slot
    pub fn exceeding_every_slot(&self) -> Vec<&VideoRecord> {
        self.unscheduled
            .iter()
            .filter(|u| u.reason == UnscheduledReason::ExceedsEverySlot)
            .map(|u| &u.video)
            .collect()
    }

    /// Assignment for a slot label
    pub fn assignment(&self, label: &str) -> Option<&SlotAssignment> {
        self.assignments.iter().find(|a| a.slot.label == label)
    }

    /// Label of the slot a video was placed in
    pub fn slot_of(&self, video_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.videos.iter().any(|v| v.id == video_id))
            .map(|a| a.slot.label.as_str())
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let mut category_distribution = BTreeMap::new();
        for video in self.scheduled() {
            if let Some(category) = video.category() {
                *category_distribution.entry(category).or_insert(0) += 1;
            }
        }

        // Budgets are capped by the scheduler, so saturation never triggers for its output
        let total_budget_seconds = self
            .assignments
            .iter()
            .fold(0u64, |total, a| total.saturating_add(a.slot.budget_seconds));

        ScheduleSummary {
            total_slots: self.assignments.len(),
            used_slots: self.assignments.iter().filter(|a| !a.is_empty()).count(),
            total_budget_seconds,
            total_scheduled_seconds: self.total_scheduled_seconds,
            category_distribution,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Schedule summary statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total_slots: usize,
    pub used_slots: usize,
    pub total_budget_seconds: u64,
    pub total_scheduled_seconds: u64,
    pub category_distribution: BTreeMap<Category, usize>,
}

impl ScheduleSummary {
    /// Fraction of the combined slot budget that was filled
    pub fn utilization(&self) -> f64 {
        if self.total_budget_seconds == 0 {
            0.0
        } else {
            self.total_scheduled_seconds as f64 / self.total_budget_seconds as f64
        }
    }
}
