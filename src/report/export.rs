//! Exporter-facing shapes
//!
//! Flat rows and events derived from a [`Report`]. Document stores, calendars
//! and playlist services consume these; how they do so is up to them.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::Report;
use crate::categorizer::extract_title_keywords;
use crate::error::{Error, Result};
use crate::models::{Category, VideoRecord};
use crate::scheduler::Schedule;
use crate::utils::format_duration;

/// Scheduling status of a kept video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoStatus {
    Scheduled,
    Unscheduled,
}

/// One row per kept video, for document-database export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub channel: Option<String>,
    pub duration_seconds: Option<u64>,
    pub duration_display: Option<String>,
    pub category: Option<Category>,
    pub confidence: Option<f64>,
    pub priority: Option<f64>,
    pub status: VideoStatus,
    pub slot: Option<String>,
    /// Source topics, or title keywords when the source gave none
    pub tags: Vec<String>,
    /// Set for unscheduled videos
    pub note: Option<String>,
}

fn row(video: &VideoRecord, status: VideoStatus, slot: Option<String>, note: Option<String>) -> DocumentRow {
    let tags = if video.topics.is_empty() {
        video
            .title
            .as_deref()
            .map(extract_title_keywords)
            .unwrap_or_default()
    } else {
        video.topics.iter().cloned().collect()
    };

    DocumentRow {
        id: video.id.clone(),
        title: video.display_title().to_string(),
        channel: video.channel.clone(),
        duration_seconds: video.duration_seconds,
        duration_display: video.duration_seconds.map(format_duration),
        category: video.category(),
        confidence: video.category_confidence(),
        priority: video.priority_score(),
        status,
        slot,
        tags,
        note,
    }
}

/// Rows for every scheduled and unscheduled video, scheduled first
pub fn document_rows(report: &Report) -> Vec<DocumentRow> {
    let schedule = &report.schedule;
    let scheduled = schedule.assignments.iter().flat_map(|a| {
        a.videos
            .iter()
            .map(move |v| row(v, VideoStatus::Scheduled, Some(a.slot.label.clone()), None))
    });
    let unscheduled = schedule.unscheduled.iter().map(|u| {
        row(
            &u.video,
            VideoStatus::Unscheduled,
            None,
            Some(u.reason.as_str().to_string()),
        )
    });
    scheduled.chain(unscheduled).collect()
}

/// Calendar event for one non-empty slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration_minutes: u64,
    pub video_ids: Vec<String>,
    pub description: String,
}

/// One event per slot that received videos
///
/// The event ends when the scheduled videos end, not at the slot's end.
pub fn calendar_events(schedule: &Schedule) -> Vec<CalendarEvent> {
    schedule
        .assignments
        .iter()
        .filter(|a| !a.is_empty())
        .map(|a| {
            let description = a
                .videos
                .iter()
                .map(|v| {
                    format!(
                        "- {} ({})",
                        v.display_title(),
                        format_duration(v.duration_seconds.unwrap_or(0))
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            let start = a.slot.start;
            let end = start.map(|s| s + Duration::seconds(a.used_seconds as i64));
            CalendarEvent {
                title: format!("{} viewing session", a.slot.label),
                start,
                end,
                duration_minutes: a.used_seconds.div_ceil(60),
                video_ids: a.videos.iter().map(|v| v.id.clone()).collect(),
                description,
            }
        })
        .collect()
}

/// Playlist contents for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistPlan {
    pub category: Category,
    pub video_ids: Vec<String>,
    pub total_available: usize,
}

/// Group categorized videos into per-category playlists
///
/// Each playlist is ordered by priority (then id) and capped at
/// `max_videos_per_playlist`. Categories come back in the order requested.
pub fn plan_playlists(
    videos: &[VideoRecord],
    categories: &[Category],
    max_videos_per_playlist: usize,
) -> Result<Vec<PlaylistPlan>> {
    if max_videos_per_playlist == 0 {
        return Err(Error::config("max videos per playlist must be greater than 0"));
    }

    let mut plans = Vec::with_capacity(categories.len());
    for &category in categories {
        let mut members: Vec<&VideoRecord> = Vec::new();
        for video in videos {
            if video.require_category()? == category {
                members.push(video);
            }
        }
        members.sort_by(|a, b| {
            let pa = a.priority_score().unwrap_or(0.0);
            let pb = b.priority_score().unwrap_or(0.0);
            pb.total_cmp(&pa).then_with(|| a.id.cmp(&b.id))
        });
        plans.push(PlaylistPlan {
            category,
            total_available: members.len(),
            video_ids: members
                .iter()
                .take(max_videos_per_playlist)
                .map(|v| v.id.clone())
                .collect(),
        });
    }
    Ok(plans)
}
