//! End-to-end queue processing
//!
//! ```text
//!   RawVideoRecord[] ─► build ─► filter ─► categorize ─► score ─► schedule ─► Report
//!                                  │                                            ▲
//!                                  └──────────── removed (unreachable) ─────────┘
//! ```
//!
//! A [`Pipeline`] holds only validated configuration and a read-only rule
//! set, so one instance can serve concurrent runs from several threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

use crate::categorizer::{Categorizer, RuleSet};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{filter_available, FilterOutcome};
use crate::models::{build_all, Category, RawVideoRecord, VideoRecord};
use crate::report::Report;
use crate::scheduler::{
    ensure_unique_labels, resolve_slots, slots_from_presets, PackingPolicy, Scheduler, TimeSlot,
    TimeSlotSpec, DEFAULT_PRESET_LIMIT_MINUTES,
};
use crate::scoring::{LengthBand, PriorityScorer, ScoringWeights};

fn default_preset_limit() -> u64 {
    DEFAULT_PRESET_LIMIT_MINUTES
}

/// Scheduling part of a pipeline request
///
/// Fields left unset fall back to the pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub time_slots: Vec<TimeSlotSpec>,

    /// Preset names, resolved after `time_slots`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<String>,

    /// Categories every preset session is restricted to; empty keeps each
    /// preset's own list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preset_categories: Vec<Category>,

    /// Cap on each preset session's focus duration
    #[serde(default = "default_preset_limit")]
    pub duration_limit_minutes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_length_band: Option<LengthBand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_weights: Option<ScoringWeights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packing_policy: Option<PackingPolicy>,
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self {
            time_slots: Vec::new(),
            presets: Vec::new(),
            preset_categories: Vec::new(),
            duration_limit_minutes: DEFAULT_PRESET_LIMIT_MINUTES,
            preferred_length_band: None,
            scoring_weights: None,
            packing_policy: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleRequestFile {
    Slots(Vec<TimeSlotSpec>),
    Full(ScheduleRequest),
}

impl ScheduleRequest {
    /// Request with explicit slots and nothing else overridden
    pub fn with_slots(time_slots: Vec<TimeSlotSpec>) -> Self {
        Self {
            time_slots,
            ..Default::default()
        }
    }

    /// Parse either a full request object or a bare slot array
    pub fn from_json_str(content: &str) -> Result<Self> {
        let parsed = serde_json::from_str::<ScheduleRequestFile>(content)
            .map_err(|e| Error::config(format!("malformed scheduling request: {e}")))?;
        Ok(match parsed {
            ScheduleRequestFile::Full(request) => request,
            ScheduleRequestFile::Slots(time_slots) => Self::with_slots(time_slots),
        })
    }

    /// Validate and resolve every requested slot, explicit ones first
    pub fn resolve_slots(&self) -> Result<Vec<TimeSlot>> {
        if self.time_slots.is_empty() && self.presets.is_empty() {
            return Err(Error::config("scheduling request has no time slots"));
        }

        let mut slots = if self.time_slots.is_empty() {
            Vec::new()
        } else {
            resolve_slots(self.time_slots.clone())?
        };
        if !self.presets.is_empty() {
            slots.extend(slots_from_presets(
                &self.presets,
                &self.preset_categories,
                self.duration_limit_minutes,
            )?);
        }
        ensure_unique_labels(&slots)?;
        Ok(slots)
    }
}

/// One pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub videos: Vec<RawVideoRecord>,

    /// Rule set override for this run only
    pub rules: Option<RuleSet>,

    pub schedule: ScheduleRequest,

    /// Reference time for recency and queue statistics
    pub as_of: DateTime<Utc>,
}

impl PipelineRequest {
    pub fn new(videos: Vec<RawVideoRecord>, schedule: ScheduleRequest, as_of: DateTime<Utc>) -> Self {
        Self {
            videos,
            rules: None,
            schedule,
            as_of,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// Pipeline runner
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    rules: Cow<'static, RuleSet>,
}

impl Pipeline {
    /// Validate the configuration and load its rule set
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let rules = config.load_rules()?;
        Ok(Self { config, rules })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rule set used when a request carries no override
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Run every stage and assemble the report
    pub fn run(&self, request: PipelineRequest) -> Result<Report> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id, as_of = %request.as_of);
        let _guard = span.enter();

        let PipelineRequest {
            videos,
            rules,
            schedule,
            as_of,
        } = request;
        let rules: &RuleSet = match &rules {
            Some(rules) => rules,
            None => self.rules(),
        };

        // Everything configurable is checked before any record is touched
        let categorizer = Categorizer::new(rules, self.config.pipeline.confidence_threshold)?;
        let scorer = self.scorer(
            rules,
            as_of,
            schedule.scoring_weights,
            schedule.preferred_length_band,
        )?;
        let slots = schedule.resolve_slots()?;
        let policy = schedule
            .packing_policy
            .unwrap_or(self.config.pipeline.packing_policy);

        let (filtered, scored) = annotate(videos, &categorizer, &scorer)?;
        let schedule = Scheduler::new(policy).schedule(scored.clone(), slots)?;

        let report = Report::assemble(&filtered, &scored, schedule, as_of)?;
        tracing::info!(
            kept = report.counts.kept,
            removed = report.counts.removed_unavailable,
            scheduled = report.counts.scheduled,
            unscheduled = report.counts.unscheduled,
            policy = policy.as_str(),
            "Pipeline run complete"
        );
        Ok(report)
    }

    /// Build, filter, categorize and score without scheduling
    ///
    /// Returns the filter outcome and the kept records with category and
    /// priority assigned, in input order.
    pub fn score_queue(
        &self,
        videos: Vec<RawVideoRecord>,
        as_of: DateTime<Utc>,
    ) -> Result<(FilterOutcome, Vec<VideoRecord>)> {
        let categorizer = Categorizer::new(self.rules(), self.config.pipeline.confidence_threshold)?;
        let scorer = self.scorer(self.rules(), as_of, None, None)?;
        annotate(videos, &categorizer, &scorer)
    }

    fn scorer<'r>(
        &self,
        rules: &'r RuleSet,
        as_of: DateTime<Utc>,
        weights: Option<ScoringWeights>,
        band: Option<LengthBand>,
    ) -> Result<PriorityScorer<'r>> {
        let scoring = &self.config.scoring;
        let scorer = PriorityScorer::new(rules, as_of)
            .with_weights(weights.unwrap_or(scoring.weights))?
            .with_params(scoring.params)?;
        match band.or(scoring.preferred_length_band) {
            Some(band) => scorer.with_length_band(band),
            None => Ok(scorer),
        }
    }
}

fn annotate(
    videos: Vec<RawVideoRecord>,
    categorizer: &Categorizer<'_>,
    scorer: &PriorityScorer<'_>,
) -> Result<(FilterOutcome, Vec<VideoRecord>)> {
    let records = build_all(videos)?;
    tracing::info!(records = records.len(), "Built video records");

    let filtered = filter_available(records)?;
    let categorized = categorizer.categorize_all(filtered.kept.clone())?;
    let (scored, _) = scorer.score_all(categorized)?;
    Ok((filtered, scored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::error::WatchlaterErrorTrait;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn raw(id: &str, title: &str, duration: i64) -> RawVideoRecord {
        RawVideoRecord {
            id: id.to_string(),
            title: Some(title.to_string()),
            duration_seconds: Some(duration),
            reachable: true,
            ..Default::default()
        }
    }

    fn slots(budget: i64) -> ScheduleRequest {
        ScheduleRequest::with_slots(vec![TimeSlotSpec {
            label: "evening".to_string(),
            duration_budget_seconds: Some(budget),
            ..Default::default()
        }])
    }

    #[test]
    fn test_pipeline_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }

    #[test]
    fn test_run_end_to_end() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let mut gone = raw("gone", "Removed", 100);
        gone.reachable = false;
        let request = PipelineRequest::new(
            vec![
                raw("a", "Rust conference keynote", 1200),
                raw("b", "Full course tutorial", 900),
                gone,
            ],
            slots(1800),
            as_of(),
        );

        let report = pipeline.run(request).unwrap();
        assert_eq!(report.counts.total_input, 3);
        assert_eq!(report.counts.removed_unavailable, 1);
        assert_eq!(report.counts.scheduled + report.counts.unscheduled, 2);
        assert!(report.durations.total_scheduled_seconds <= 1800);
    }

    #[test]
    fn test_missing_slots_is_configuration_error() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let request = PipelineRequest::new(vec![raw("a", "x", 60)], ScheduleRequest::default(), as_of());
        let err = pipeline.run(request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_incomplete_reachable_record() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let mut untitled = raw("a", "x", 60);
        untitled.title = None;
        let err = pipeline
            .run(PipelineRequest::new(vec![untitled], slots(600), as_of()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRecord);
    }

    #[test]
    fn test_score_queue_skips_scheduling() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        let (filtered, scored) = pipeline
            .score_queue(vec![raw("a", "Learn Rust", 300), raw("b", "Vlog", 60)], as_of())
            .unwrap();
        assert_eq!(filtered.kept.len(), 2);
        assert!(scored.iter().all(|v| v.priority_score().is_some()));
        assert_eq!(scored[0].id, "a");
    }

    #[test]
    fn test_schedule_request_accepts_bare_array() {
        let request =
            ScheduleRequest::from_json_str(r#"[{"label": "a", "duration_budget_seconds": 600}]"#)
                .unwrap();
        assert_eq!(request.time_slots.len(), 1);

        let request = ScheduleRequest::from_json_str(
            r#"{"presets": ["weekday-morning"], "packing_policy": "duration_first"}"#,
        )
        .unwrap();
        assert_eq!(request.packing_policy, Some(PackingPolicy::DurationFirst));
        let slots = request.resolve_slots().unwrap();
        assert_eq!(slots[0].budget_seconds, 30 * 60);
        assert_eq!(request.duration_limit_minutes, 120);
    }

    #[test]
    fn test_presets_take_categories_and_limit() {
        let request = ScheduleRequest::from_json_str(
            r#"{"presets": ["weekend-morning"], "preset_categories": ["Tech"], "duration_limit_minutes": 45}"#,
        )
        .unwrap();
        let slots = request.resolve_slots().unwrap();
        assert_eq!(slots[0].budget_seconds, 45 * 60);
        assert!(slots[0].permits(Category::Tech));
        assert!(!slots[0].permits(Category::Education));
    }

    #[test]
    fn test_explicit_slot_and_preset_share_label() {
        let mut request = slots(600);
        request.time_slots[0].label = "weekday-evening".to_string();
        request.presets = vec!["weekday-evening".to_string()];
        let err = request.resolve_slots().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
