//! Integration tests module
//!
//! End-to-end tests for the watchlater pipeline, including:
//! - Complete build → filter → categorize → score → schedule → report runs
//! - Availability filter partition properties
//! - Error tagging at the boundary

pub mod error_scenarios;
pub mod filter_test;
pub mod fixtures;
pub mod pipeline_test;
