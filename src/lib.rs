//! watchlater - Watch Later queue planner
//!
//! Turns a raw "watch later" queue into a prioritized viewing schedule.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Video records and the category vocabulary
//! - [`filter`] - Availability filtering
//! - [`categorizer`] - Rule-based categorization
//! - [`scoring`] - Priority scoring
//! - [`scheduler`] - Packing videos into time slots
//! - [`report`] - Report assembly and exporter shapes
//! - [`pipeline`] - End-to-end run over all stages
//! - [`source`] - Metadata source and exporter abstractions
//! - [`config`] - Configuration management and settings
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use watchlater::config::Config;
//! use watchlater::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
//! use watchlater::source::{JsonFileSource, MetadataSource};
//!
//! fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(Config::from_env()?)?;
//!     let videos = JsonFileSource::new("queue.json").fetch()?;
//!     let schedule = ScheduleRequest::from_json_str(&std::fs::read_to_string("slots.json")?)?;
//!     let report = pipeline.run(PipelineRequest::new(videos, schedule, chrono::Utc::now()))?;
//!     println!("{}", report.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod categorizer;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod source;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::categorizer::{Categorizer, CategoryRule, RuleSet};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, ErrorReport, Result, WatchlaterErrorTrait};
    pub use crate::models::{Category, RawVideoRecord, VideoRecord};
    pub use crate::pipeline::{Pipeline, PipelineRequest, ScheduleRequest};
    pub use crate::report::Report;
    pub use crate::scheduler::{PackingPolicy, Schedule, Scheduler, TimeSlot, TimeSlotSpec};
    pub use crate::scoring::PriorityScorer;
    pub use crate::source::{MetadataSource, ReportExporter};
}

// Direct re-exports for convenience
pub use models::{Category, RawVideoRecord, VideoRecord};
