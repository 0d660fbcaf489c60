//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow:
//! 1. Queue file read through the metadata source
//! 2. Record build and availability filter
//! 3. Categorization and scoring
//! 4. Slot packing
//! 5. Report assembly and export

use std::collections::HashSet;
use tempfile::TempDir;
use watchlater::categorizer::{CategoryRule, RuleSet};
use watchlater::config::Config;
use watchlater::models::Category;
use watchlater::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
use watchlater::report::{calendar_events, document_rows, plan_playlists, VideoStatus};
use watchlater::scheduler::PackingPolicy;
use watchlater::source::{
    InMemoryExporter, InMemorySource, JsonFileExporter, JsonFileSource, MetadataSource,
    ReportExporter,
};

use super::fixtures::{sample_as_of, temp_file, SAMPLE_QUEUE_JSON, SAMPLE_SLOTS_JSON};

fn sample_request() -> PipelineRequest {
    let queue = temp_file(".json", SAMPLE_QUEUE_JSON);
    let videos = JsonFileSource::new(queue.path()).fetch().unwrap();
    let schedule = ScheduleRequest::from_json_str(SAMPLE_SLOTS_JSON).unwrap();
    PipelineRequest::new(videos, schedule, sample_as_of())
}

// ============================================================================
// Complete Pipeline Tests
// ============================================================================

#[test]
fn test_sample_queue_categories() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let report = pipeline.run(sample_request()).unwrap();

    let per_category = &report.counts.per_category;
    assert_eq!(per_category[&Category::Conference], 1);
    assert_eq!(per_category[&Category::Tutorial], 1);
    assert_eq!(per_category[&Category::Productivity], 1);
    assert_eq!(per_category[&Category::Entertainment], 2);
    assert_eq!(per_category[&Category::Education], 1);
    assert_eq!(per_category[&Category::Tech], 1);
    assert_eq!(per_category.values().sum::<usize>(), 7);
    assert_eq!(report.durations.total_kept_seconds, 10_800);
}

#[test]
fn test_sample_queue_schedule_invariants() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let report = pipeline.run(sample_request()).unwrap();
    let schedule = &report.schedule;

    let weeknight = schedule.assignment("weeknight").unwrap();
    assert_eq!(weeknight.slot.budget_seconds, 3600);
    for video in &weeknight.videos {
        assert!(matches!(
            video.category(),
            Some(Category::Education | Category::Tutorial | Category::Tech)
        ));
    }

    let saturday = schedule.assignment("saturday").unwrap();
    assert_eq!(saturday.slot.budget_seconds, 7200);

    for assignment in &schedule.assignments {
        assert!(assignment.used_seconds <= assignment.slot.budget_seconds);
    }

    // The weeknight slot cannot be packed exactly, so something is left over
    assert!(!schedule.unscheduled.is_empty());
    assert_eq!(report.counts.scheduled + report.counts.unscheduled, 7);

    let mut ids = HashSet::new();
    for video in schedule.scheduled() {
        assert!(ids.insert(video.id.clone()));
        assert!(video.priority_score().is_some());
    }
    for item in &schedule.unscheduled {
        assert!(ids.insert(item.video.id.clone()));
    }
    assert_eq!(ids.len(), 7);
}

#[test]
fn test_reports_are_reproducible() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let first = pipeline.run(sample_request()).unwrap().to_json().unwrap();
    let second = pipeline.run(sample_request()).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_runs_share_pipeline() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let expected = pipeline.run(sample_request()).unwrap().to_json().unwrap();

    let shared = &pipeline;
    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || shared.run(sample_request()).unwrap().to_json().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for output in outputs {
        assert_eq!(output, expected);
    }
}

#[test]
fn test_rule_override_leaves_default_untouched() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let everything_is_tech =
        RuleSet::new(vec![CategoryRule::new(Category::Tech, ["."])], 0.5).unwrap();

    let report = pipeline
        .run(sample_request().with_rules(everything_is_tech))
        .unwrap();
    assert_eq!(report.counts.per_category[&Category::Tech], 7);
    assert_eq!(report.counts.per_category.len(), 1);

    assert_eq!(RuleSet::default_rules().len(), 8);
    assert_eq!(pipeline.rules().len(), 8);
    let report = pipeline.run(sample_request()).unwrap();
    assert_eq!(report.counts.per_category[&Category::Tech], 1);
}

#[test]
fn test_packing_policy_from_request() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let mut request = sample_request();
    request.schedule.packing_policy = Some(PackingPolicy::DurationFirst);
    let report = pipeline.run(request).unwrap();

    // Longest learning video goes into the restricted slot first
    let weeknight = report.schedule.assignment("weeknight").unwrap();
    assert_eq!(weeknight.video_ids(), vec!["v02"]);
}

#[test]
fn test_presets_in_request() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let mut request = sample_request();
    request.schedule = ScheduleRequest {
        presets: vec!["weekday-morning".to_string()],
        ..Default::default()
    };
    let report = pipeline.run(request).unwrap();
    let slot = report.schedule.assignment("weekday-morning").unwrap();
    assert_eq!(slot.slot.budget_seconds, 1800);
    for video in &slot.videos {
        assert!(matches!(
            video.category(),
            Some(Category::Short | Category::Productivity)
        ));
    }
}

#[test]
fn test_presets_restricted_to_categories_with_limit() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let mut request = sample_request();
    request.schedule = ScheduleRequest {
        presets: vec!["weekend-morning".to_string(), "weekend-afternoon".to_string()],
        preset_categories: vec![Category::Tech, Category::Conference],
        duration_limit_minutes: 60,
        ..Default::default()
    };
    let report = pipeline.run(request).unwrap();

    for assignment in &report.schedule.assignments {
        assert_eq!(assignment.slot.budget_seconds, 3600);
    }
    // Keynote (2400s) and deep dive (2700s) cannot share one hour
    let scheduled: HashSet<&str> = report.schedule.scheduled().map(|v| v.id.as_str()).collect();
    assert_eq!(scheduled, HashSet::from(["v01", "v08"]));
    assert!(report
        .schedule
        .assignments
        .iter()
        .all(|a| a.videos.len() == 1));
}

#[test]
fn test_repeated_preset_rejected() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let mut request = sample_request();
    request.schedule = ScheduleRequest {
        presets: vec!["weekday-evening".to_string(), "weekday-evening".to_string()],
        ..Default::default()
    };
    let err = pipeline.run(request).unwrap_err();
    assert!(err.to_string().contains("duplicate time slot label"));
}

// ============================================================================
// Export Tests
// ============================================================================

#[test]
fn test_json_exporter_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("reports").join("plan.json");

    let pipeline = Pipeline::new(Config::default()).unwrap();
    let report = pipeline.run(sample_request()).unwrap();
    JsonFileExporter::new(&path).export(&report).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["counts"]["kept"], 7);
    assert_eq!(written["counts"]["removed_unavailable"], 3);
    assert_eq!(written, report.to_value().unwrap());
}

#[test]
fn test_in_memory_collaborators() {
    let queue = temp_file(".json", SAMPLE_QUEUE_JSON);
    let source = InMemorySource::new(JsonFileSource::new(queue.path()).fetch().unwrap());
    let exporter = InMemoryExporter::new();

    let pipeline = Pipeline::new(Config::default()).unwrap();
    let schedule = ScheduleRequest::from_json_str(SAMPLE_SLOTS_JSON).unwrap();
    let report = pipeline
        .run(PipelineRequest::new(source.fetch().unwrap(), schedule, sample_as_of()))
        .unwrap();
    exporter.export(&report).unwrap();

    let exported = exporter.exported();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0]["counts"]["total_input"], 10);
}

#[test]
fn test_exporter_shapes() {
    let pipeline = Pipeline::new(Config::default()).unwrap();
    let report = pipeline.run(sample_request()).unwrap();

    let rows = document_rows(&report);
    assert_eq!(rows.len(), 7);
    let scheduled_rows = rows.iter().filter(|r| r.status == VideoStatus::Scheduled).count();
    assert_eq!(scheduled_rows, report.counts.scheduled);
    let vlog = rows.iter().find(|r| r.id == "v10").unwrap();
    assert_eq!(vlog.tags, vec!["daily life"]);

    let events = calendar_events(&report.schedule);
    assert!(events.len() <= 2);
    if let Some(saturday) = events.iter().find(|e| e.title == "saturday viewing session") {
        assert_eq!(saturday.start, Some("2024-06-01T14:00:00Z".parse().unwrap()));
    }

    let (_, scored) = pipeline
        .score_queue(sample_request().videos, sample_as_of())
        .unwrap();
    let plans = plan_playlists(&scored, &[Category::Entertainment], 1).unwrap();
    assert_eq!(plans[0].total_available, 2);
    assert_eq!(plans[0].video_ids.len(), 1);
}
