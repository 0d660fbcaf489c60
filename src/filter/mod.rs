//! Availability filtering
//!
//! Splits the queue into reachable and unreachable records using only the
//! `reachable` flag supplied by the metadata source. Duplicate identifiers are
//! rejected so the report counts always add up.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::VideoRecord;

/// Result of availability filtering
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOutcome {
    /// Reachable records, in input order
    pub kept: Vec<VideoRecord>,

    /// Unreachable records, in input order
    pub removed: Vec<VideoRecord>,
}

impl FilterOutcome {
    /// Total number of records seen
    pub fn total(&self) -> usize {
        self.kept.len() + self.removed.len()
    }

    /// Identifiers of the removed records
    pub fn removed_ids(&self) -> Vec<&str> {
        self.removed.iter().map(|v| v.id.as_str()).collect()
    }
}

/// Reject collections containing the same identifier twice
pub fn ensure_unique_ids(videos: &[VideoRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(videos.len());
    for video in videos {
        if !seen.insert(video.id.as_str()) {
            return Err(Error::invalid_input(format!(
                "duplicate video id '{}'",
                video.id
            )));
        }
    }
    Ok(())
}

/// Partition records into (kept, removed) by reachability
pub fn filter_available(videos: Vec<VideoRecord>) -> Result<FilterOutcome> {
    ensure_unique_ids(&videos)?;

    let (kept, removed): (Vec<_>, Vec<_>) = videos.into_iter().partition(|v| v.reachable);

    for video in &removed {
        tracing::debug!(
            id = %video.id,
            reason = video.unavailable_reason.map(|r| r.as_str()).unwrap_or("unknown"),
            "Removing unreachable video"
        );
    }
    tracing::info!(
        kept = kept.len(),
        removed = removed.len(),
        "Availability filter complete"
    );

    Ok(FilterOutcome { kept, removed })
}
