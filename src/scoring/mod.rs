//! Priority scoring
//!
//! Four components, each normalized to [0, 1]:
//!
//! | Component | Formula |
//! |-----------|---------|
//! | recency | `0.5^(age_days / half_life_days)`, age from `added_at` else `published_at`, clamped at 0 |
//! | duration fit | 1.0 inside the preferred band, `exp(-distance / falloff)` outside, 1.0 without a band |
//! | engagement | `min(1, ln(1 + views) / ln(1 + saturation_views))` |
//! | category | rule weight / largest weight in the rule set |
//!
//! The score is the weighted mean over the components that are present. A
//! record without timestamps has no recency component and a record without a
//! view count has no engagement component; their weights drop out of both the
//! numerator and the denominator instead of counting as zero.
//!
//! This favours sparse records. A record known only by duration and category
//! is judged on those two alone, so it can outrank a complete record whose
//! recency or engagement is poor. Callers who want missing data to cost
//! priority should supply timestamps and view counts, or raise the category
//! and duration-fit weights so the sparse components matter less.
//!
//! The reference time is always passed in, so a fixed `as_of` reproduces the
//! same score bit for bit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categorizer::RuleSet;
use crate::error::{Error, Result};
use crate::models::VideoRecord;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ============================================================================
// Weights & Parameters
// ============================================================================

/// Relative weight of each score component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default)]
    pub recency: f64,
    #[serde(default)]
    pub duration_fit: f64,
    #[serde(default)]
    pub engagement: f64,
    #[serde(default)]
    pub category: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency: 0.3,
            duration_fit: 0.2,
            engagement: 0.2,
            category: 0.3,
        }
    }
}

impl ScoringWeights {
    /// Weights must be finite, non-negative and not all zero
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("recency", self.recency),
            ("duration_fit", self.duration_fit),
            ("engagement", self.engagement),
            ("category", self.category),
        ];
        for (name, weight) in all {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::config(format!(
                    "scoring weight '{name}' is invalid: {weight}"
                )));
            }
        }
        if all.iter().all(|(_, w)| *w == 0.0) {
            return Err(Error::config("all scoring weights are zero"));
        }
        Ok(())
    }
}

/// Preferred video length, inclusive, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBand {
    pub min_seconds: u64,
    pub max_seconds: u64,
}

impl LengthBand {
    pub fn new(min_seconds: u64, max_seconds: u64) -> Result<Self> {
        let band = Self {
            min_seconds,
            max_seconds,
        };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_seconds > self.max_seconds {
            return Err(Error::config(format!(
                "preferred length band min {}s is above max {}s",
                self.min_seconds, self.max_seconds
            )));
        }
        Ok(())
    }

    /// Seconds outside the band, 0 when inside
    pub fn distance(&self, seconds: u64) -> u64 {
        if seconds < self.min_seconds {
            self.min_seconds - seconds
        } else if seconds > self.max_seconds {
            seconds - self.max_seconds
        } else {
            0
        }
    }
}

/// Shape parameters of the component curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Age in days at which recency halves
    pub recency_half_life_days: f64,

    /// View count at which engagement saturates to 1.0
    pub engagement_saturation_views: u64,

    /// Seconds outside the band at which duration fit drops to 1/e
    pub duration_falloff_secs: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            recency_half_life_days: 30.0,
            engagement_saturation_views: 1_000_000,
            duration_falloff_secs: 600.0,
        }
    }
}

impl ScoringParams {
    pub fn validate(&self) -> Result<()> {
        if !self.recency_half_life_days.is_finite() || self.recency_half_life_days <= 0.0 {
            return Err(Error::config(format!(
                "recency half-life {} must be positive",
                self.recency_half_life_days
            )));
        }
        if self.engagement_saturation_views == 0 {
            return Err(Error::config("engagement saturation must be greater than 0"));
        }
        if !self.duration_falloff_secs.is_finite() || self.duration_falloff_secs <= 0.0 {
            return Err(Error::config(format!(
                "duration falloff {} must be positive",
                self.duration_falloff_secs
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Components
// ============================================================================

/// Recency component; `None` when the record has no timestamps
pub fn recency_component(
    video: &VideoRecord,
    as_of: DateTime<Utc>,
    half_life_days: f64,
) -> Option<f64> {
    let reference = video.added_at.or(video.published_at)?;
    let age_secs = (as_of - reference).num_seconds().max(0) as f64;
    let age_days = age_secs / SECONDS_PER_DAY;
    Some(0.5_f64.powf(age_days / half_life_days).clamp(0.0, 1.0))
}

/// Duration-fit component
pub fn duration_fit_component(seconds: u64, band: Option<&LengthBand>, falloff_secs: f64) -> f64 {
    match band {
        None => 1.0,
        Some(band) => {
            let distance = band.distance(seconds) as f64;
            (-distance / falloff_secs).exp().clamp(0.0, 1.0)
        }
    }
}

/// Engagement component; `None` when the view count is unknown
pub fn engagement_component(view_count: Option<u64>, saturation_views: u64) -> Option<f64> {
    let views = view_count? as f64;
    let scaled = (1.0 + views).ln() / (1.0 + saturation_views as f64).ln();
    Some(scaled.clamp(0.0, 1.0))
}

/// Category component from the rule set weights
pub fn category_component(video: &VideoRecord, rules: &RuleSet) -> Result<f64> {
    let category = video.require_category()?;
    let max = rules.max_weight();
    if max <= 0.0 {
        return Ok(0.0);
    }
    Ok((rules.weight_of(category) / max).clamp(0.0, 1.0))
}

/// Per-record score with its components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub id: String,
    pub recency: Option<f64>,
    pub duration_fit: f64,
    pub engagement: Option<f64>,
    pub category: f64,
    pub score: f64,
}

// ============================================================================
// Scorer
// ============================================================================

/// Computes priority scores against a fixed reference time
#[derive(Debug, Clone)]
pub struct PriorityScorer<'a> {
    rules: &'a RuleSet,
    weights: ScoringWeights,
    params: ScoringParams,
    band: Option<LengthBand>,
    as_of: DateTime<Utc>,
}

impl<'a> PriorityScorer<'a> {
    /// Create a scorer with default weights and parameters
    pub fn new(rules: &'a RuleSet, as_of: DateTime<Utc>) -> Self {
        Self {
            rules,
            weights: ScoringWeights::default(),
            params: ScoringParams::default(),
            band: None,
            as_of,
        }
    }

    /// Set component weights
    pub fn with_weights(mut self, weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Set curve parameters
    pub fn with_params(mut self, params: ScoringParams) -> Result<Self> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    /// Set preferred length band
    pub fn with_length_band(mut self, band: LengthBand) -> Result<Self> {
        band.validate()?;
        self.band = Some(band);
        Ok(self)
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// Compute the score of a categorized record
    pub fn breakdown(&self, video: &VideoRecord) -> Result<ScoreBreakdown> {
        let duration = video.require_duration()?;
        let category = category_component(video, self.rules)?;
        let recency = recency_component(video, self.as_of, self.params.recency_half_life_days);
        let duration_fit =
            duration_fit_component(duration, self.band.as_ref(), self.params.duration_falloff_secs);
        let engagement =
            engagement_component(video.view_count, self.params.engagement_saturation_views);

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let components = [
            (recency, self.weights.recency),
            (Some(duration_fit), self.weights.duration_fit),
            (engagement, self.weights.engagement),
            (Some(category), self.weights.category),
        ];
        for (value, weight) in components {
            if let Some(value) = value {
                weighted += weight * value;
                total_weight += weight;
            }
        }

        let score = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(ScoreBreakdown {
            id: video.id.clone(),
            recency,
            duration_fit,
            engagement,
            category,
            score,
        })
    }

    /// Assign the priority score to one record
    pub fn score(&self, mut video: VideoRecord) -> Result<(VideoRecord, ScoreBreakdown)> {
        let breakdown = self.breakdown(&video)?;
        video.assign_priority(breakdown.score)?;
        Ok((video, breakdown))
    }

    /// Assign priority scores to every record
    pub fn score_all(
        &self,
        videos: Vec<VideoRecord>,
    ) -> Result<(Vec<VideoRecord>, Vec<ScoreBreakdown>)> {
        let mut scored = Vec::with_capacity(videos.len());
        let mut breakdowns = Vec::with_capacity(videos.len());
        for video in videos {
            let (video, breakdown) = self.score(video)?;
            scored.push(video);
            breakdowns.push(breakdown);
        }
        tracing::info!(scored = scored.len(), as_of = %self.as_of, "Priority scoring complete");
        Ok((scored, breakdowns))
    }
}
