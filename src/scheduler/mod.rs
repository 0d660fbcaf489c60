//! Viewing session scheduling
//!
//! This module packs scored, categorized videos into caller-supplied time
//! slots.
//!
//! # Overview
//!
//! ```text
//!   scored videos ──► sort (PackingPolicy) ──► queue
//!                                               │
//!   slots (in order) ──► for each slot: scan queue, admit what fits
//!                                               │
//!                               ┌───────────────┴──────────────┐
//!                               ▼                              ▼
//!                        SlotAssignment[]              UnscheduledVideo[]
//! ```
//!
//! # Modules
//!
//! - [`slot`] - Time slot request shape and validation
//! - [`packing`] - Queue ordering and the greedy packing pass
//! - [`schedule`] - Schedule output and summary statistics
//! - [`presets`] - Named viewing windows (weekday-evening, ...)
//! - [`allocation`] - Proportional time split across categories
//!
//! # Quick Start
//!
//! ```ignore
//! use watchlater::scheduler::{Scheduler, PackingPolicy, TimeSlot};
//! use watchlater::models::Category;
//!
//! let scheduler = Scheduler::new(PackingPolicy::PriorityFirst);
//! let slots = vec![
//!     TimeSlot::new("tuesday-evening", 3600).with_categories([Category::Education]),
//!     TimeSlot::new("saturday", 7200),
//! ];
//! let schedule = scheduler.schedule(scored_videos, slots)?;
//! for assignment in &schedule.assignments {
//!     println!("{}: {:?}", assignment.slot.label, assignment.video_ids());
//! }
//! ```
//!
//! # Policies
//!
//! | Policy | Order |
//! |--------|-------|
//! | `priority_first` (default) | priority desc, duration asc, id asc |
//! | `duration_first` | duration desc, priority desc, id asc |

pub mod allocation;
pub mod packing;
pub mod presets;
pub mod schedule;
pub mod slot;

// Re-export main types
pub use allocation::{allocate_time, CategoryAllocation, TimeAllocation};
pub use packing::{PackingPolicy, Scheduler};
pub use presets::{slots_from_presets, EnergyLevel, SlotPreset, DEFAULT_PRESET_LIMIT_MINUTES};
pub use schedule::{
    Schedule, ScheduleSummary, SlotAssignment, UnscheduledReason, UnscheduledVideo,
};
pub use slot::{
    ensure_unique_labels, resolve_slots, TimeSlot, TimeSlotSpec, MAX_SLOT_BUDGET_SECONDS,
};
