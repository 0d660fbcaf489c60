//! Report assembly
//!
//! Pure aggregation of the filter, categorizer and scheduler outputs into the
//! summary handed back to the caller and to exporters.

pub mod export;

pub use export::{calendar_events, document_rows, plan_playlists, CalendarEvent, DocumentRow, PlaylistPlan, VideoStatus};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::filter::FilterOutcome;
use crate::models::{Category, VideoRecord};
use crate::scheduler::Schedule;

/// Record count breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportCounts {
    pub total_input: usize,
    pub removed_unavailable: usize,
    pub kept: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub scheduled: usize,
    pub unscheduled: usize,
    pub exceeds_every_slot: usize,
}

/// Duration sums in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportDurations {
    pub total_kept_seconds: u64,
    pub total_scheduled_seconds: u64,
    pub per_category_seconds: BTreeMap<Category, u64>,
}

/// Unreachable video as listed in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedVideo {
    pub id: String,
    pub title: Option<String>,
    pub reason: Option<String>,
}

/// Queue-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueStats {
    pub average_duration_seconds: Option<f64>,
    pub longest_video_id: Option<String>,
    pub longest_duration_seconds: Option<u64>,
    /// Days since the oldest known `added_at`, relative to `as_of`
    pub oldest_queued_days: Option<i64>,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub as_of: DateTime<Utc>,
    pub counts: ReportCounts,
    pub durations: ReportDurations,
    pub removed: Vec<RemovedVideo>,
    pub stats: QueueStats,
    pub schedule: Schedule,
}

impl Report {
    /// Assemble the report from stage outputs
    ///
    /// `categorized` holds the kept records after categorization; the
    /// schedule holds the same records after scoring.
    pub fn assemble(
        filter: &FilterOutcome,
        categorized: &[VideoRecord],
        schedule: Schedule,
        as_of: DateTime<Utc>,
    ) -> Result<Self> {
        let mut per_category = BTreeMap::new();
        let mut per_category_seconds: BTreeMap<Category, u64> = BTreeMap::new();
        let mut total_kept_seconds: u64 = 0;

        for video in categorized {
            let duration = video.duration_seconds.unwrap_or(0);
            total_kept_seconds = add_seconds(total_kept_seconds, duration)?;
            if let Some(category) = video.category() {
                *per_category.entry(category).or_insert(0) += 1;
                let seconds = per_category_seconds.entry(category).or_insert(0);
                *seconds = add_seconds(*seconds, duration)?;
            }
        }

        let counts = ReportCounts {
            total_input: filter.total(),
            removed_unavailable: filter.removed.len(),
            kept: filter.kept.len(),
            per_category,
            scheduled: schedule.scheduled_count(),
            unscheduled: schedule.unscheduled.len(),
            exceeds_every_slot: schedule.exceeding_every_slot().len(),
        };

        let durations = ReportDurations {
            total_kept_seconds,
            total_scheduled_seconds: schedule.total_scheduled_seconds,
            per_category_seconds,
        };

        let removed = filter
            .removed
            .iter()
            .map(|v| RemovedVideo {
                id: v.id.clone(),
                title: v.title.clone(),
                reason: v.unavailable_reason.map(|r| r.as_str().to_string()),
            })
            .collect();

        Ok(Self {
            as_of,
            counts,
            durations,
            removed,
            stats: queue_stats(categorized, as_of)?,
            schedule,
        })
    }

    /// Serialize to a plain nested value
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn add_seconds(total: u64, duration: u64) -> Result<u64> {
    total
        .checked_add(duration)
        .ok_or_else(|| Error::invalid_input("queue duration total overflows"))
}

fn queue_stats(videos: &[VideoRecord], as_of: DateTime<Utc>) -> Result<QueueStats> {
    let durations: Vec<(&str, u64)> = videos
        .iter()
        .filter_map(|v| v.duration_seconds.map(|d| (v.id.as_str(), d)))
        .collect();

    let average_duration_seconds = if durations.is_empty() {
        None
    } else {
        let sum = durations
            .iter()
            .try_fold(0u64, |total, &(_, d)| add_seconds(total, d))?;
        Some(sum as f64 / durations.len() as f64)
    };

    // Earliest id wins on equal length
    let longest = durations
        .iter()
        .fold(None::<(&str, u64)>, |best, &(id, d)| match best {
            Some((_, best_d)) if best_d >= d => best,
            _ => Some((id, d)),
        });

    let oldest_queued_days = videos
        .iter()
        .filter_map(|v| v.added_at)
        .min()
        .map(|oldest| (as_of - oldest).num_days());

    Ok(QueueStats {
        average_duration_seconds,
        longest_video_id: longest.map(|(id, _)| id.to_string()),
        longest_duration_seconds: longest.map(|(_, d)| d),
        oldest_queued_days,
    })
}
