//! Rule-based video categorization
//!
//! Rules are evaluated in rule-set order. A rule's match score is the fraction
//! of its keyword patterns found in `"{title} {channel}"`, multiplied by 1.0 if
//! its duration predicate holds (or it has none) and 0.0 otherwise. The first
//! rule whose score strictly exceeds the confidence threshold wins and its
//! score becomes the confidence. When nothing clears the threshold the video
//! falls back to [`Category::Uncategorized`] with confidence 0.0.
//!
//! Because the first qualifying rule wins, two rules with identical qualifying
//! scores always resolve to the earlier one, independent of any hashing or
//! iteration order.

pub mod keywords;
pub mod rules;

pub use keywords::extract_title_keywords;
pub use rules::{CategoryRule, CompiledRule, DurationRange, RuleSet, RuleSetFile};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Category, VideoRecord};

/// Default confidence threshold a rule must exceed
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Outcome of evaluating a rule set against one video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub category: Category,
    pub confidence: f64,
    /// Index of the winning rule, `None` for the fallback
    pub rule_index: Option<usize>,
    /// Score of every rule, in rule-set order
    pub rule_scores: Vec<(Category, f64)>,
}

/// Deterministic rule engine over a borrowed rule set
#[derive(Debug, Clone, Copy)]
pub struct Categorizer<'a> {
    rules: &'a RuleSet,
    threshold: f64,
}

impl<'a> Categorizer<'a> {
    /// Create a categorizer; the threshold must lie in [0, 1)
    pub fn new(rules: &'a RuleSet, threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { rules, threshold })
    }

    /// Categorizer over the process-wide default rules
    pub fn with_default_rules() -> Self {
        Self {
            rules: RuleSet::default_rules(),
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Evaluate all rules without modifying the record
    pub fn evaluate(&self, video: &VideoRecord) -> Result<CategoryMatch> {
        let title = video.require_title()?;
        let duration = video.require_duration()?;

        let text = match video.channel.as_deref() {
            Some(channel) => format!("{title} {channel}"),
            None => title.to_string(),
        };

        let rule_scores: Vec<(Category, f64)> = self
            .rules
            .rules()
            .iter()
            .map(|rule| (rule.category(), rule.match_score(&text, duration)))
            .collect();

        let winner = rule_scores
            .iter()
            .position(|(_, score)| *score > self.threshold);

        let (category, confidence) = match winner {
            Some(index) => rule_scores[index],
            None => (Category::Uncategorized, 0.0),
        };

        Ok(CategoryMatch {
            category,
            confidence,
            rule_index: winner,
            rule_scores,
        })
    }

    /// Annotate one record with its category and confidence
    pub fn categorize(&self, mut video: VideoRecord) -> Result<VideoRecord> {
        let matched = self.evaluate(&video)?;
        tracing::debug!(
            id = %video.id,
            category = %matched.category,
            confidence = matched.confidence,
            "Categorized video"
        );
        video.assign_category(matched.category, matched.confidence)?;
        Ok(video)
    }

    /// Annotate every record, failing on the first incomplete one
    pub fn categorize_all(&self, videos: Vec<VideoRecord>) -> Result<Vec<VideoRecord>> {
        let categorized = videos
            .into_iter()
            .map(|v| self.categorize(v))
            .collect::<Result<Vec<_>>>()?;

        let fallback = categorized
            .iter()
            .filter(|v| v.category() == Some(Category::Uncategorized))
            .count();
        tracing::info!(
            categorized = categorized.len(),
            uncategorized = fallback,
            "Categorization complete"
        );
        Ok(categorized)
    }
}

/// Check that a confidence threshold lies in [0, 1)
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..1.0).contains(&threshold) {
        return Err(Error::config(format!(
            "confidence threshold {threshold} must be in [0, 1)"
        )));
    }
    Ok(())
}
