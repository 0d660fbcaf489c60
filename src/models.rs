// Core data structures for the watchlater pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::utils::normalize_whitespace;

/// Fixed category vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Education,
    Tech,
    Tutorial,
    Entertainment,
    Productivity,
    Conference,
    Short,
    Long,
    Uncategorized,
}

impl Category {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Education => "Education",
            Self::Tech => "Tech",
            Self::Tutorial => "Tutorial",
            Self::Entertainment => "Entertainment",
            Self::Productivity => "Productivity",
            Self::Conference => "Conference",
            Self::Short => "Short",
            Self::Long => "Long",
            Self::Uncategorized => "Uncategorized",
        }
    }

    /// Human readable description of what the category holds
    pub fn description(&self) -> &'static str {
        match self {
            Self::Education => "Tutorials, courses, how-to videos",
            Self::Tech => "Programming, software reviews, tech news",
            Self::Tutorial => "Step-by-step walkthroughs and hands-on builds",
            Self::Entertainment => "Gaming, comedy, vlogs",
            Self::Productivity => "Business, self-improvement, life hacks",
            Self::Conference => "Talks, presentations, lectures",
            Self::Short => "Videos under 10 minutes",
            Self::Long => "Videos over 1 hour",
            Self::Uncategorized => "Matched no rule",
        }
    }

    /// Create from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "education" => Some(Self::Education),
            "tech" => Some(Self::Tech),
            "tutorial" => Some(Self::Tutorial),
            "entertainment" => Some(Self::Entertainment),
            "productivity" => Some(Self::Productivity),
            "conference" => Some(Self::Conference),
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            "uncategorized" => Some(Self::Uncategorized),
            _ => None,
        }
    }

    /// Get all categories, fallback last
    pub fn all() -> Vec<Self> {
        vec![
            Self::Education,
            Self::Tech,
            Self::Tutorial,
            Self::Entertainment,
            Self::Productivity,
            Self::Conference,
            Self::Short,
            Self::Long,
            Self::Uncategorized,
        ]
    }

    /// Whether this is the fallback category
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Uncategorized)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::config(format!("unknown category '{s}'")))
    }
}

/// Longest accepted video duration (one week)
pub const MAX_DURATION_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Why the metadata source reports a video as unreachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnavailableReason {
    Deleted,
    Private,
    Unavailable,
}

impl UnavailableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Private => "private",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Raw record as delivered by the metadata source
///
/// Missing optional fields stay `None`; they are never read as zero.
/// `reachable` has no default and must be present in every source record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVideoRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "channel_name")]
    pub channel: Option<String>,
    /// Signed so that a negative value from the source can be rejected
    #[serde(default)]
    pub duration_seconds: Option<i64>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: Option<u64>,
    pub reachable: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub unavailable_reason: Option<UnavailableReason>,
}

/// Canonical in-memory video record
///
/// Source attributes are fixed once built. `category`, `category_confidence`
/// and `priority_score` start empty and are each written once by the
/// categorizer and scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub duration_seconds: Option<u64>,
    pub published_at: Option<DateTime<Utc>>,
    pub added_at: Option<DateTime<Utc>>,
    pub view_count: Option<u64>,
    pub reachable: bool,
    pub topics: BTreeSet<String>,
    pub unavailable_reason: Option<UnavailableReason>,
    category: Option<Category>,
    category_confidence: Option<f64>,
    priority_score: Option<f64>,
}

impl VideoRecord {
    /// Normalize a raw source record into a video record
    pub fn build(raw: RawVideoRecord) -> Result<Self> {
        let id = raw.id.trim().to_string();
        if id.is_empty() {
            return Err(Error::invalid_input("video record with empty id"));
        }

        let duration_seconds = match raw.duration_seconds {
            Some(d) if d < 0 => {
                return Err(Error::invalid_input(format!(
                    "video '{id}' has negative duration {d}"
                )));
            }
            Some(d) if d as u64 > MAX_DURATION_SECONDS => {
                return Err(Error::invalid_input(format!(
                    "video '{id}' duration {d}s exceeds the {MAX_DURATION_SECONDS}s limit"
                )));
            }
            Some(d) => Some(d as u64),
            None => None,
        };

        let topics = raw
            .topics
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            id,
            title: non_empty(raw.title),
            channel: non_empty(raw.channel),
            duration_seconds,
            published_at: raw.published_at,
            added_at: raw.added_at,
            view_count: raw.view_count,
            reachable: raw.reachable,
            topics,
            unavailable_reason: raw.unavailable_reason,
            category: None,
            category_confidence: None,
            priority_score: None,
        })
    }

    /// Assigned category, if categorized
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Confidence of the assigned category in [0, 1]
    pub fn category_confidence(&self) -> Option<f64> {
        self.category_confidence
    }

    /// Assigned priority score, if scored
    pub fn priority_score(&self) -> Option<f64> {
        self.priority_score
    }

    /// Title or an error naming the missing field
    pub fn require_title(&self) -> Result<&str> {
        self.title
            .as_deref()
            .ok_or_else(|| Error::incomplete(&self.id, "title"))
    }

    /// Duration or an error naming the missing field
    pub fn require_duration(&self) -> Result<u64> {
        self.duration_seconds
            .ok_or_else(|| Error::incomplete(&self.id, "duration"))
    }

    /// Category or an error naming the missing field
    pub fn require_category(&self) -> Result<Category> {
        self.category
            .ok_or_else(|| Error::incomplete(&self.id, "category"))
    }

    /// Priority score or an error naming the missing field
    pub fn require_priority(&self) -> Result<f64> {
        self.priority_score
            .ok_or_else(|| Error::incomplete(&self.id, "priority_score"))
    }

    /// Record the categorizer's decision (write-once)
    pub fn assign_category(&mut self, category: Category, confidence: f64) -> Result<()> {
        if self.category.is_some() {
            return Err(Error::invalid_input(format!(
                "video '{}' is already categorized",
                self.id
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(Error::invalid_input(format!(
                "confidence {confidence} for video '{}' is outside [0, 1]",
                self.id
            )));
        }
        self.category = Some(category);
        self.category_confidence = Some(confidence);
        Ok(())
    }

    /// Record the scorer's priority (write-once)
    pub fn assign_priority(&mut self, score: f64) -> Result<()> {
        if self.priority_score.is_some() {
            return Err(Error::invalid_input(format!(
                "video '{}' is already scored",
                self.id
            )));
        }
        self.priority_score = Some(score);
        Ok(())
    }

    /// Title for display, with a placeholder for records without one
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("[Untitled Video]")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_whitespace(&v))
        .filter(|v| !v.is_empty())
}

/// Build every raw record in order, failing on the first malformed one
pub fn build_all(raws: Vec<RawVideoRecord>) -> Result<Vec<VideoRecord>> {
    raws.into_iter().map(VideoRecord::build).collect()
}
