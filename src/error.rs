//! Unified error handling for the watchlater crate
//!
//! Every pipeline stage validates its own input and fails fast with one of
//! three core kinds:
//!
//! - [`Error::InvalidInput`] - malformed or duplicate video records
//! - [`Error::IncompleteRecord`] - a record lacks a field the stage needs
//! - [`Error::Configuration`] - malformed rule set, slot list or settings
//!
//! The remaining variants only come from the file-backed collaborators in
//! [`crate::source`] and from configuration loading.
//!
//! At the boundary an error is turned into an [`ErrorReport`], a tagged value
//! that serializes as `{"kind": "InvalidInputError", "message": "..."}`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use watchlater::error::{Error, ErrorKind, WatchlaterErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.kind() == ErrorKind::Configuration {
//!         eprintln!("Fix your rules: {err}");
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Common trait for watchlater error types
pub trait WatchlaterErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error kind used for the tagged boundary report
    fn kind(&self) -> ErrorKind;
}

/// Classification of errors as reported at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or duplicate video records
    #[serde(rename = "InvalidInputError")]
    InvalidInput,
    /// A record is missing a field required by a stage
    #[serde(rename = "IncompleteRecordError")]
    IncompleteRecord,
    /// Malformed rule set, slot list or settings
    #[serde(rename = "ConfigurationError")]
    Configuration,
    /// File system errors from collaborators
    #[serde(rename = "IoError")]
    Io,
    /// JSON/TOML decoding or encoding errors from collaborators
    #[serde(rename = "SerializationError")]
    Serialization,
}

impl ErrorKind {
    /// Tag used in the serialized boundary report
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInputError",
            Self::IncompleteRecord => "IncompleteRecordError",
            Self::Configuration => "ConfigurationError",
            Self::Io => "IoError",
            Self::Serialization => "SerializationError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for the watchlater crate
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input records (duplicate ids, negative durations, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record lacks a field the current stage requires
    #[error("Incomplete record '{id}': missing {field}")]
    IncompleteRecord { id: String, field: &'static str },

    /// Malformed rules, slots or settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl WatchlaterErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        // I/O errors are often transient; everything else is deterministic
        matches!(self, Self::Io(_))
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::IncompleteRecord { .. } => ErrorKind::IncompleteRecord,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) | Self::Toml(_) | Self::TomlSer(_) => ErrorKind::Serialization,
        }
    }
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an incomplete record error
    pub fn incomplete(id: impl Into<String>, field: &'static str) -> Self {
        Self::IncompleteRecord {
            id: id.into(),
            field,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Convert into the tagged boundary form
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Tagged error result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        err.to_report()
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
