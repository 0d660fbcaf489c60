//! Greedy slot packing
//!
//! Videos are ordered once according to the [`PackingPolicy`]. Slots are then
//! filled in the order supplied: each slot scans the whole remaining queue and
//! admits every video whose category it permits and whose duration fits the
//! remaining budget. A video that does not fit is skipped but stays queued, so
//! smaller videos further back can still use the space. Admitted videos leave
//! the queue.
//!
//! This is a best-effort approximation of bin packing. It always produces a
//! valid assignment (no slot over budget, every video at most once) but not
//! necessarily an optimal one. Each slot makes one marking scan over the
//! remaining queue and one compaction, so runtime is O(videos x slots).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::schedule::{Schedule, SlotAssignment, UnscheduledReason, UnscheduledVideo};
use super::slot::{ensure_unique_labels, TimeSlot, MAX_SLOT_BUDGET_SECONDS};
use crate::error::{Error, Result};
use crate::models::{Category, VideoRecord, MAX_DURATION_SECONDS};

/// Queue ordering used before packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingPolicy {
    /// Highest priority first, shorter first on ties
    #[default]
    PriorityFirst,
    /// Longest first, higher priority first on ties
    DurationFirst,
}

impl PackingPolicy {
    /// Parse from configuration strings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "priority_first" | "priority" => Some(Self::PriorityFirst),
            "duration_first" | "duration" => Some(Self::DurationFirst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriorityFirst => "priority_first",
            Self::DurationFirst => "duration_first",
        }
    }
}

/// Queue entry with the fields packing needs pulled out once
#[derive(Debug)]
struct QueuedVideo {
    video: VideoRecord,
    duration: u64,
    priority: f64,
    category: Category,
}

impl QueuedVideo {
    fn from_record(video: VideoRecord) -> Result<Self> {
        let duration = video.require_duration()?;
        if duration > MAX_DURATION_SECONDS {
            return Err(Error::invalid_input(format!(
                "video '{}' duration {duration}s exceeds the {MAX_DURATION_SECONDS}s limit",
                video.id
            )));
        }
        let priority = video.require_priority()?;
        let category = video.require_category()?;
        Ok(Self {
            video,
            duration,
            priority,
            category,
        })
    }
}

fn compare(policy: PackingPolicy, a: &QueuedVideo, b: &QueuedVideo) -> Ordering {
    let by_priority = b.priority.total_cmp(&a.priority);
    let ordering = match policy {
        PackingPolicy::PriorityFirst => by_priority.then_with(|| a.duration.cmp(&b.duration)),
        PackingPolicy::DurationFirst => b.duration.cmp(&a.duration).then(by_priority),
    };
    ordering.then_with(|| a.video.id.cmp(&b.video.id))
}

/// Packs scored, categorized videos into time slots
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    policy: PackingPolicy,
}

impl Scheduler {
    pub fn new(policy: PackingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PackingPolicy {
        self.policy
    }

    /// Order videos the way the packing pass will consume them
    pub fn sorted_queue(&self, videos: Vec<VideoRecord>) -> Result<Vec<VideoRecord>> {
        let mut queue = self.prepare(videos)?;
        queue.sort_by(|a, b| compare(self.policy, a, b));
        Ok(queue.into_iter().map(|q| q.video).collect())
    }

    fn prepare(&self, videos: Vec<VideoRecord>) -> Result<Vec<QueuedVideo>> {
        crate::filter::ensure_unique_ids(&videos)?;
        videos.into_iter().map(QueuedVideo::from_record).collect()
    }

    /// Produce a schedule; never fails on a feasible but suboptimal packing
    pub fn schedule(&self, videos: Vec<VideoRecord>, slots: Vec<TimeSlot>) -> Result<Schedule> {
        if slots.is_empty() {
            return Err(Error::config("scheduling request has no time slots"));
        }
        ensure_unique_labels(&slots)?;
        if let Some(slot) = slots.iter().find(|s| s.budget_seconds > MAX_SLOT_BUDGET_SECONDS) {
            return Err(Error::config(format!(
                "time slot '{}' budget {}s exceeds the {MAX_SLOT_BUDGET_SECONDS}s limit",
                slot.label, slot.budget_seconds
            )));
        }

        let mut queue = self.prepare(videos)?;
        queue.sort_by(|a, b| compare(self.policy, a, b));

        let largest_budget = slots.iter().map(|s| s.budget_seconds).max().unwrap_or(0);

        // Reasons depend on the full slot list, so classify before slots are consumed
        let reasons_for = |q: &QueuedVideo| -> UnscheduledReason {
            if q.duration > largest_budget {
                return UnscheduledReason::ExceedsEverySlot;
            }
            let mut permitted = slots.iter().filter(|s| s.permits(q.category)).peekable();
            if permitted.peek().is_none() {
                return UnscheduledReason::CategoryNotPermitted;
            }
            if permitted.all(|s| s.budget_seconds < q.duration) {
                return UnscheduledReason::NoFittingSlot;
            }
            UnscheduledReason::CapacityExhausted
        };

        let reasons: Vec<UnscheduledReason> = queue.iter().map(reasons_for).collect();
        let mut pending: Vec<(QueuedVideo, UnscheduledReason)> = queue.into_iter().zip(reasons).collect();
        let mut assignments = Vec::with_capacity(slots.len());
        let mut total_scheduled_seconds: u64 = 0;

        for slot in slots {
            let mut assignment = SlotAssignment::new(slot);
            if assignment.remaining_seconds == 0 {
                tracing::debug!(slot = %assignment.slot.label, "Slot has no budget, skipping");
                assignments.push(assignment);
                continue;
            }

            // Mark in one scan, then compact the queue once
            let mut remaining = assignment.remaining_seconds;
            let admitted: Vec<bool> = pending
                .iter()
                .map(|(candidate, _)| {
                    let take = remaining > 0
                        && candidate.duration <= remaining
                        && assignment.slot.permits(candidate.category);
                    if take {
                        remaining -= candidate.duration;
                    }
                    take
                })
                .collect();

            let mut still_pending = Vec::with_capacity(pending.len());
            for ((queued, reason), take) in pending.into_iter().zip(admitted) {
                if !take {
                    still_pending.push((queued, reason));
                    continue;
                }
                tracing::debug!(
                    slot = %assignment.slot.label,
                    id = %queued.video.id,
                    duration = queued.duration,
                    priority = queued.priority,
                    "Admitted video"
                );
                total_scheduled_seconds = total_scheduled_seconds
                    .checked_add(queued.duration)
                    .ok_or_else(|| Error::invalid_input("scheduled duration total overflows"))?;
                assignment.admit(queued.video, queued.duration);
            }
            pending = still_pending;

            tracing::debug!(
                slot = %assignment.slot.label,
                videos = assignment.videos.len(),
                used = assignment.used_seconds,
                remaining = assignment.remaining_seconds,
                "Slot packed"
            );
            assignments.push(assignment);
        }

        let unscheduled: Vec<UnscheduledVideo> = pending
            .into_iter()
            .map(|(q, reason)| {
                if reason == UnscheduledReason::ExceedsEverySlot {
                    tracing::warn!(
                        id = %q.video.id,
                        duration = q.duration,
                        largest_budget,
                        "Video is longer than every slot"
                    );
                }
                UnscheduledVideo {
                    video: q.video,
                    reason,
                }
            })
            .collect();

        let schedule = Schedule {
            assignments,
            unscheduled,
            total_scheduled_seconds,
        };

        tracing::info!(
            scheduled = schedule.scheduled_count(),
            unscheduled = schedule.unscheduled.len(),
            seconds = schedule.total_scheduled_seconds,
            policy = self.policy.as_str(),
            "Scheduling complete"
        );

        Ok(schedule)
    }
}
