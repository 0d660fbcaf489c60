//! Error scenario integration tests
//!
//! Tests that every failure surfaces as a tagged error:
//! 1. Malformed records (InvalidInputError)
//! 2. Records missing required fields (IncompleteRecordError)
//! 3. Malformed rules, slots and settings (ConfigurationError)
//! 4. Collaborator failures (IoError)

use watchlater::config::Config;
use watchlater::error::{Error, ErrorKind, ErrorReport, WatchlaterErrorTrait};
use watchlater::models::RawVideoRecord;
use watchlater::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
use watchlater::scheduler::TimeSlotSpec;
use watchlater::source::{JsonFileSource, MetadataSource};

use super::fixtures::{sample_as_of, temp_file};

fn raw(id: &str, duration: Option<i64>) -> RawVideoRecord {
    RawVideoRecord {
        id: id.to_string(),
        title: Some(format!("Video {id}")),
        duration_seconds: duration,
        reachable: true,
        ..Default::default()
    }
}

fn one_slot() -> ScheduleRequest {
    ScheduleRequest::with_slots(vec![TimeSlotSpec {
        label: "evening".to_string(),
        duration_budget_seconds: Some(3600),
        ..Default::default()
    }])
}

fn run(videos: Vec<RawVideoRecord>, schedule: ScheduleRequest) -> Result<(), Error> {
    let pipeline = Pipeline::new(Config::default())?;
    pipeline.run(PipelineRequest::new(videos, schedule, sample_as_of()))?;
    Ok(())
}

// ============================================================================
// Record Errors
// ============================================================================

#[test]
fn test_duplicate_ids() {
    let err = run(vec![raw("a", Some(60)), raw("a", Some(90))], one_slot()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("duplicate video id 'a'"));
}

#[test]
fn test_negative_duration() {
    let err = run(vec![raw("a", Some(-1))], one_slot()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_durations_beyond_limit_rejected() {
    let videos = vec![
        raw("a", Some(i64::MAX)),
        raw("b", Some(i64::MAX)),
        raw("c", Some(i64::MAX)),
    ];
    let err = run(videos, one_slot()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let huge_slots = ScheduleRequest::with_slots(
        (0..3)
            .map(|i| TimeSlotSpec {
                label: format!("slot-{i}"),
                duration_budget_seconds: Some(i64::MAX),
                ..Default::default()
            })
            .collect(),
    );
    let err = run(vec![raw("a", Some(60))], huge_slots).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_queue_record_without_reachable_flag() {
    let queue = temp_file(".json", r#"[{"id": "x", "title": "Learn Rust", "duration_seconds": 60}]"#);
    let err = JsonFileSource::new(queue.path()).fetch().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_reachable_record_without_duration() {
    let err = run(vec![raw("a", None)], one_slot()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompleteRecord);
    assert!(!err.is_recoverable());
}

#[test]
fn test_unreachable_record_without_metadata_is_fine() {
    let gone = RawVideoRecord {
        id: "gone".to_string(),
        reachable: false,
        ..Default::default()
    };
    assert!(run(vec![raw("a", Some(60)), gone], one_slot()).is_ok());
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_empty_slot_list() {
    let err = run(vec![raw("a", Some(60))], ScheduleRequest::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_slot_ending_before_start() {
    let schedule = ScheduleRequest::from_json_str(
        r#"[{"label": "bad", "start": "2024-06-01T20:00:00Z", "end": "2024-06-01T19:00:00Z"}]"#,
    )
    .unwrap();
    let err = run(vec![raw("a", Some(60))], schedule).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_slot_errors_win_over_record_errors() {
    // Configuration is validated before any record is built
    let err = run(vec![raw("a", Some(-1))], ScheduleRequest::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_unknown_preset() {
    let schedule = ScheduleRequest {
        presets: vec!["midnight-snack".to_string()],
        ..Default::default()
    };
    let err = run(vec![raw("a", Some(60))], schedule).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("weekday-morning"));
}

#[test]
fn test_invalid_request_weights() {
    let mut schedule = one_slot();
    schedule.scoring_weights = Some(watchlater::scoring::ScoringWeights {
        recency: -1.0,
        ..Default::default()
    });
    let err = run(vec![raw("a", Some(60))], schedule).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_malformed_slot_document() {
    let err = ScheduleRequest::from_json_str(r#"{"time_slots": 42}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_invalid_threshold_rejected_at_construction() {
    let mut config = Config::default();
    config.pipeline.confidence_threshold = 1.5;
    let err = Pipeline::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_invalid_rules_file_rejected_at_construction() {
    let rules = temp_file(".json", r#"{"rules": [{"name": "Tech", "keyword_patterns": ["(unclosed"]}]}"#);
    let mut config = Config::default();
    config.pipeline.rules_path = Some(rules.path().to_path_buf());
    let err = Pipeline::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ============================================================================
// Collaborator Errors & Boundary Form
// ============================================================================

#[test]
fn test_missing_queue_file_is_io_error() {
    let err = JsonFileSource::new("/nonexistent/queue.json").fetch().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.is_recoverable());
}

#[test]
fn test_error_report_tags() {
    let err = run(vec![raw("a", None)], one_slot()).unwrap_err();
    let report: ErrorReport = (&err).into();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["kind"], "IncompleteRecordError");
    assert!(value["message"].as_str().unwrap().contains("'a'"));

    let err = run(vec![raw("a", Some(60))], ScheduleRequest::default()).unwrap_err();
    assert_eq!(serde_json::to_value(err.to_report()).unwrap()["kind"], "ConfigurationError");
}
