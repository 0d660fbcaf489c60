//! Test fixtures for integration tests
//!
//! Provides sample queue and scheduling documents as a metadata source would
//! deliver them.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::io::Write;
use tempfile::NamedTempFile;

/// Sample queue with ten records, three of them unreachable
pub const SAMPLE_QUEUE_JSON: &str = r#"{
    "videos": [
        {"id": "v01", "reachable": true, "title": "Rust conference keynote: async in depth", "channel": "RustConf", "duration_seconds": 2400, "added_at": "2024-05-30T12:00:00Z", "view_count": 120000},
        {"id": "v02", "reachable": true, "title": "Python tutorial for beginners - full course", "channel": "Code Academy", "duration_seconds": 3000, "added_at": "2024-05-01T12:00:00Z", "view_count": 900000},
        {"id": "v03", "title": "[Deleted video]", "reachable": false, "unavailable_reason": "deleted"},
        {"id": "v04", "reachable": true, "title": "Productivity tips: my notion workflow", "channel_name": "Thomas Frank", "duration_seconds": 480, "published_at": "2024-04-01T00:00:00Z"},
        {"id": "v05", "reachable": true, "title": "Funny cat compilation", "channel": "Cats", "duration_seconds": 300, "view_count": 5000000},
        {"id": "v06", "title": "[Private video]", "reachable": false, "unavailable_reason": "private"},
        {"id": "v07", "reachable": true, "title": "Lecture 4: linear algebra explained", "channel": "MIT OpenCourseWare", "duration_seconds": 1800, "added_at": "2024-05-20T12:00:00Z"},
        {"id": "v08", "reachable": true, "title": "Kubernetes programming deep dive", "channel": "Cloud Native", "duration_seconds": 2700},
        {"id": "v09", "reachable": false},
        {"id": "v10", "reachable": true, "title": "Quick vlog", "channel": "Someone", "duration_seconds": 120, "topics": ["Daily Life"]}
    ]
}"#;

/// Two windows, one restricted to learning content
pub const SAMPLE_SLOTS_JSON: &str = r#"{
    "time_slots": [
        {"label": "weeknight", "duration_budget_seconds": 3600, "allowed_categories": ["Education", "Tutorial", "Tech"]},
        {"label": "saturday", "start": "2024-06-01T14:00:00Z", "end": "2024-06-01T16:00:00Z"}
    ],
    "preferred_length_band": {"min_seconds": 300, "max_seconds": 2700}
}"#;

/// Reference time matching the sample documents
pub fn sample_as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Write content to a temporary file with the given suffix
pub fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}
