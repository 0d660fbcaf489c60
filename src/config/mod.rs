//! Configuration management for watchlater
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files. Command-line flags override individual values in `main`.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::categorizer::{validate_threshold, RuleSet, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::error::{Error, Result};
use crate::scheduler::PackingPolicy;
use crate::scoring::{LengthBand, ScoringParams, ScoringWeights};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Categorization and packing configuration
    pub pipeline: PipelineConfig,

    /// Priority scoring configuration
    pub scoring: ScoringConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Pipeline stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Score a category rule must exceed to win
    pub confidence_threshold: f64,

    /// Queue ordering before slot packing
    pub packing_policy: PackingPolicy,

    /// Rule set override (TOML or JSON); the built-in rules when unset
    pub rules_path: Option<PathBuf>,
}

/// Scoring configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,

    pub params: ScoringParams,

    /// Preferred video length
    pub preferred_length_band: Option<LengthBand>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            packing_policy: PackingPolicy::default(),
            rules_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("{name} has an invalid value: '{value}'"))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults. A set but unparsable variable is a
    /// configuration error rather than being silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(threshold) = env_parse::<f64>("WATCHLATER_CONFIDENCE_THRESHOLD")? {
            config.pipeline.confidence_threshold = threshold;
        }

        if let Ok(policy) = std::env::var("WATCHLATER_PACKING_POLICY") {
            config.pipeline.packing_policy = PackingPolicy::parse(&policy).ok_or_else(|| {
                Error::config(format!(
                    "unknown packing policy '{policy}'. Valid options: priority_first, duration_first"
                ))
            })?;
        }

        config.pipeline.rules_path = std::env::var("WATCHLATER_RULES_PATH").ok().map(PathBuf::from);

        if let Some(days) = env_parse::<f64>("WATCHLATER_RECENCY_HALF_LIFE_DAYS")? {
            config.scoring.params.recency_half_life_days = days;
        }

        if let Some(views) = env_parse::<u64>("WATCHLATER_ENGAGEMENT_SATURATION_VIEWS")? {
            config.scoring.params.engagement_saturation_views = views;
        }

        if let Some(secs) = env_parse::<f64>("WATCHLATER_DURATION_FALLOFF_SECS")? {
            config.scoring.params.duration_falloff_secs = secs;
        }

        if let Ok(level) = std::env::var("WATCHLATER_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(format) = std::env::var("WATCHLATER_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            Error::config(format!("failed to parse config file {}: {e}", path.display()))
        })?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.pipeline.confidence_threshold)?;
        self.scoring.weights.validate()?;
        self.scoring.params.validate()?;

        if let Some(band) = &self.scoring.preferred_length_band {
            band.validate()?;
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config(format!(
                "log format '{}' must be 'text' or 'json'",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Rule set to categorize with
    ///
    /// Borrows the process-wide default rules unless `rules_path` is set.
    pub fn load_rules(&self) -> Result<Cow<'static, RuleSet>> {
        match &self.pipeline.rules_path {
            Some(path) => {
                let rules = RuleSet::from_file(path)?;
                tracing::info!(path = %path.display(), rules = rules.len(), "Loaded rule set override");
                Ok(Cow::Owned(rules))
            }
            None => Ok(Cow::Borrowed(RuleSet::default_rules())),
        }
    }
}
