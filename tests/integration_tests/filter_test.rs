//! Availability filter tests
//!
//! Partition properties over arbitrary queues plus the ten-record scenario.

use proptest::prelude::*;
use std::collections::HashSet;
use watchlater::filter::filter_available;
use watchlater::models::{build_all, RawVideoRecord, VideoRecord};
use watchlater::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
use watchlater::source::{JsonFileSource, MetadataSource};
use watchlater::config::Config;

use super::fixtures::{sample_as_of, temp_file, SAMPLE_QUEUE_JSON, SAMPLE_SLOTS_JSON};

fn record(index: usize, reachable: bool) -> VideoRecord {
    VideoRecord::build(RawVideoRecord {
        id: format!("id-{index}"),
        reachable,
        ..Default::default()
    })
    .unwrap()
}

proptest! {
    #[test]
    fn prop_filter_partitions_input(flags in prop::collection::vec(any::<bool>(), 0..50)) {
        let input: Vec<VideoRecord> = flags
            .iter()
            .enumerate()
            .map(|(i, &reachable)| record(i, reachable))
            .collect();
        let outcome = filter_available(input.clone()).unwrap();

        let kept: HashSet<&str> = outcome.kept.iter().map(|v| v.id.as_str()).collect();
        let removed: HashSet<&str> = outcome.removed.iter().map(|v| v.id.as_str()).collect();

        prop_assert!(kept.is_disjoint(&removed));
        prop_assert_eq!(kept.len() + removed.len(), input.len());
        prop_assert_eq!(outcome.total(), input.len());
        for video in &input {
            if video.reachable {
                prop_assert!(kept.contains(video.id.as_str()));
            } else {
                prop_assert!(removed.contains(video.id.as_str()));
            }
        }

        // Relative order survives on both sides
        let expected_kept: Vec<&str> = input.iter().filter(|v| v.reachable).map(|v| v.id.as_str()).collect();
        let actual_kept: Vec<&str> = outcome.kept.iter().map(|v| v.id.as_str()).collect();
        prop_assert_eq!(expected_kept, actual_kept);
    }
}

#[test]
fn test_ten_records_three_unreachable() {
    let queue = temp_file(".json", SAMPLE_QUEUE_JSON);
    let videos = JsonFileSource::new(queue.path()).fetch().unwrap();
    assert_eq!(videos.len(), 10);

    let outcome = filter_available(build_all(videos.clone()).unwrap()).unwrap();
    assert_eq!(outcome.kept.len(), 7);
    assert_eq!(outcome.removed_ids(), vec!["v03", "v06", "v09"]);

    let pipeline = Pipeline::new(Config::default()).unwrap();
    let schedule = ScheduleRequest::from_json_str(SAMPLE_SLOTS_JSON).unwrap();
    let report = pipeline
        .run(PipelineRequest::new(videos, schedule, sample_as_of()))
        .unwrap();

    assert_eq!(report.counts.total_input, 10);
    assert_eq!(report.counts.removed_unavailable, 3);
    assert_eq!(report.counts.kept, 7);
    let removed: Vec<&str> = report.removed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(removed, vec!["v03", "v06", "v09"]);
    assert_eq!(report.removed[0].reason.as_deref(), Some("deleted"));
    assert_eq!(report.removed[2].reason, None);
}
