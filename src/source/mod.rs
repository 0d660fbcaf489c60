//! Collaborator abstractions
//!
//! The pipeline core never reads or writes anything itself. Raw records come
//! from a [`MetadataSource`] and finished reports go to a [`ReportExporter`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────┐      ┌──────────────────┐
//! │  MetadataSource  │ ───► │ Pipeline │ ───► │  ReportExporter  │
//! └──────────────────┘      └──────────┘      └──────────────────┘
//!    JsonFileSource                              JsonFileExporter
//!    InMemorySource                              InMemoryExporter
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::RawVideoRecord;
use crate::report::Report;

// ============================================================================
// Traits
// ============================================================================

/// Supplier of raw queue metadata
pub trait MetadataSource: Send + Sync {
    /// Fetch every queued record, in queue order
    fn fetch(&self) -> Result<Vec<RawVideoRecord>>;
}

/// Consumer of finished reports
pub trait ReportExporter: Send + Sync {
    fn export(&self, report: &Report) -> Result<()>;
}

// ============================================================================
// JSON file implementations
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum QueueFile {
    Records(Vec<RawVideoRecord>),
    Wrapped { videos: Vec<RawVideoRecord> },
}

/// Reads a JSON array of records, or an object with a `videos` array
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for JsonFileSource {
    fn fetch(&self) -> Result<Vec<RawVideoRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let records = match serde_json::from_str::<QueueFile>(&content) {
            Ok(QueueFile::Records(records)) | Ok(QueueFile::Wrapped { videos: records }) => records,
            Err(e) => {
                return Err(Error::invalid_input(format!(
                    "malformed queue file {}: {e}",
                    self.path.display()
                )))
            }
        };
        tracing::debug!(path = %self.path.display(), records = records.len(), "Read queue file");
        Ok(records)
    }
}

/// Writes the report as pretty JSON
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportExporter for JsonFileExporter {
    fn export(&self, report: &Report) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, report.to_json()?)?;
        tracing::info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Fixed record list, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawVideoRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawVideoRecord>) -> Self {
        Self { records }
    }
}

impl MetadataSource for InMemorySource {
    fn fetch(&self) -> Result<Vec<RawVideoRecord>> {
        Ok(self.records.clone())
    }
}

/// Keeps every exported report as a JSON value
#[derive(Debug, Default)]
pub struct InMemoryExporter {
    exported: Mutex<Vec<serde_json::Value>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports exported so far, oldest first
    pub fn exported(&self) -> Vec<serde_json::Value> {
        self.exported
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl ReportExporter for InMemoryExporter {
    fn export(&self, report: &Report) -> Result<()> {
        let value = report.to_value()?;
        let mut guard = self
            .exported
            .lock()
            .map_err(|_| Error::invalid_input("exporter lock poisoned"))?;
        guard.push(value);
        Ok(())
    }
}
