//! Common test utilities

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use watchlater::models::{Category, RawVideoRecord, UnavailableReason, VideoRecord};
use watchlater::scheduler::TimeSlotSpec;

/// Fixed reference time used by every test
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Reachable raw record with title and duration
pub fn raw(id: &str, title: &str, duration_seconds: i64) -> RawVideoRecord {
    RawVideoRecord {
        id: id.to_string(),
        title: Some(title.to_string()),
        channel: Some("Test Channel".to_string()),
        duration_seconds: Some(duration_seconds),
        added_at: Some(as_of() - Duration::days(3)),
        view_count: Some(10_000),
        reachable: true,
        ..Default::default()
    }
}

/// Unreachable raw record, as a source reports a deleted video
pub fn unreachable(id: &str) -> RawVideoRecord {
    RawVideoRecord {
        id: id.to_string(),
        title: Some(format!("[Deleted video] {id}")),
        reachable: false,
        unavailable_reason: Some(UnavailableReason::Deleted),
        ..Default::default()
    }
}

/// Record with category and priority already assigned
pub fn ready(id: &str, duration_seconds: i64, category: Category, confidence: f64, priority: f64) -> VideoRecord {
    let mut video = VideoRecord::build(raw(id, id, duration_seconds)).unwrap();
    video.assign_category(category, confidence).unwrap();
    video.assign_priority(priority).unwrap();
    video
}

/// Slot request with a fixed budget
pub fn slot_spec(label: &str, budget_seconds: i64, categories: Option<Vec<Category>>) -> TimeSlotSpec {
    TimeSlotSpec {
        label: label.to_string(),
        duration_budget_seconds: Some(budget_seconds),
        allowed_categories: categories,
        ..Default::default()
    }
}

/// Ten-record queue with three unreachable entries
pub fn mixed_queue() -> Vec<RawVideoRecord> {
    vec![
        raw("v01", "Rust conference keynote: async in depth", 2400),
        raw("v02", "Python tutorial for beginners - full course", 3000),
        unreachable("v03"),
        raw("v04", "Productivity tips: my notion workflow", 480),
        raw("v05", "Funny cat compilation", 300),
        unreachable("v06"),
        raw("v07", "Lecture 4: linear algebra explained", 1800),
        raw("v08", "Kubernetes programming deep dive", 2700),
        unreachable("v09"),
        raw("v10", "Quick vlog", 120),
    ]
}
