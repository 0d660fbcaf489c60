//! Category rules and rule sets
//!
//! A [`RuleSet`] is an ordered, validated, pre-compiled list of
//! [`CategoryRule`]s. The built-in set is constructed once per process and only
//! ever handed out by shared reference; callers wanting different rules build
//! their own `RuleSet` value and pass it to the run.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::models::Category;

/// Weight of the fallback category unless a rule file says otherwise
pub const DEFAULT_FALLBACK_WEIGHT: f64 = 0.5;

// ============================================================================
// Duration Range
// ============================================================================

/// Inclusive duration predicate in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u64>,
}

impl DurationRange {
    /// Range with only a lower bound
    pub fn at_least(min_seconds: u64) -> Self {
        Self {
            min_seconds: Some(min_seconds),
            max_seconds: None,
        }
    }

    /// Range with only an upper bound
    pub fn at_most(max_seconds: u64) -> Self {
        Self {
            min_seconds: None,
            max_seconds: Some(max_seconds),
        }
    }

    /// Range with both bounds
    pub fn between(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds: Some(min_seconds),
            max_seconds: Some(max_seconds),
        }
    }

    /// Check whether a duration satisfies the predicate
    pub fn contains(&self, seconds: u64) -> bool {
        self.min_seconds.map_or(true, |min| seconds >= min)
            && self.max_seconds.map_or(true, |max| seconds <= max)
    }

    fn validate(&self, name: Category) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_seconds, self.max_seconds) {
            if min > max {
                return Err(Error::config(format!(
                    "rule '{name}' has duration range min {min}s above max {max}s"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Category Rule
// ============================================================================

/// A named matching policy for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category assigned when this rule wins
    pub name: Category,

    /// Regular expressions matched case-insensitively against title and channel
    #[serde(default)]
    pub keyword_patterns: Vec<String>,

    /// Optional duration predicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_range: Option<DurationRange>,

    /// Category weight used by the priority scorer
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl CategoryRule {
    /// Create a rule with the given patterns and weight 1.0
    pub fn new<I, S>(name: Category, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            keyword_patterns: patterns.into_iter().map(Into::into).collect(),
            duration_range: None,
            weight: 1.0,
        }
    }

    /// Set duration predicate
    pub fn with_duration(mut self, range: DurationRange) -> Self {
        self.duration_range = Some(range);
        self
    }

    /// Set scoring weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// A rule with its patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: CategoryRule,
    patterns: Vec<Regex>,
}

impl CompiledRule {
    fn compile(rule: CategoryRule) -> Result<Self> {
        let name = rule.name;
        if name.is_fallback() {
            return Err(Error::config(format!(
                "'{name}' is the fallback category and cannot have a rule"
            )));
        }
        if rule.keyword_patterns.is_empty() && rule.duration_range.is_none() {
            return Err(Error::config(format!(
                "rule '{name}' has no keyword patterns and no duration range"
            )));
        }
        if !rule.weight.is_finite() || rule.weight < 0.0 {
            return Err(Error::config(format!(
                "rule '{name}' has invalid weight {}",
                rule.weight
            )));
        }
        if let Some(range) = &rule.duration_range {
            range.validate(name)?;
        }

        let patterns = rule
            .keyword_patterns
            .iter()
            .map(|pattern| {
                if pattern.trim().is_empty() {
                    return Err(Error::config(format!("rule '{name}' has an empty pattern")));
                }
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        Error::config(format!("rule '{name}' pattern '{pattern}' is invalid: {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rule, patterns })
    }

    pub fn category(&self) -> Category {
        self.rule.name
    }

    pub fn weight(&self) -> f64 {
        self.rule.weight
    }

    pub fn rule(&self) -> &CategoryRule {
        &self.rule
    }

    /// Match score: fraction of matched patterns, zeroed when the duration
    /// predicate fails. A rule without patterns counts as fully matched.
    pub fn match_score(&self, text: &str, duration_seconds: u64) -> f64 {
        if let Some(range) = &self.rule.duration_range {
            if !range.contains(duration_seconds) {
                return 0.0;
            }
        }
        if self.patterns.is_empty() {
            return 1.0;
        }
        let matched = self.patterns.iter().filter(|re| re.is_match(text)).count();
        matched as f64 / self.patterns.len() as f64
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// On-disk form of a rule set (TOML or JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetFile {
    #[serde(default = "default_fallback_weight")]
    pub fallback_weight: f64,
    pub rules: Vec<CategoryRule>,
}

fn default_fallback_weight() -> f64 {
    DEFAULT_FALLBACK_WEIGHT
}

/// Ordered, validated rule set
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    fallback_weight: f64,
}

impl RuleSet {
    /// Validate and compile an ordered list of rules
    pub fn new(rules: Vec<CategoryRule>, fallback_weight: f64) -> Result<Self> {
        if rules.is_empty() {
            return Err(Error::config("rule set is empty"));
        }
        if !fallback_weight.is_finite() || fallback_weight < 0.0 {
            return Err(Error::config(format!(
                "fallback weight {fallback_weight} is invalid"
            )));
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name) {
                return Err(Error::config(format!(
                    "rule set contains '{}' more than once",
                    rule.name
                )));
            }
        }

        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            fallback_weight,
        })
    }

    /// Process-wide default rules, built on first use and never mutated
    pub fn default_rules() -> &'static RuleSet {
        static DEFAULT_RULES: OnceLock<RuleSet> = OnceLock::new();

        DEFAULT_RULES.get_or_init(|| {
            RuleSet::new(builtin_rules(), DEFAULT_FALLBACK_WEIGHT)
                .expect("Invalid built-in rule set")
        })
    }

    /// Parse from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleSetFile = toml::from_str(content)
            .map_err(|e| Error::config(format!("malformed rule set: {e}")))?;
        Self::new(file.rules, file.fallback_weight)
    }

    /// Parse from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: RuleSetFile = serde_json::from_str(content)
            .map_err(|e| Error::config(format!("malformed rule set: {e}")))?;
        Self::new(file.rules, file.fallback_weight)
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Convert back to the on-disk form
    pub fn to_file(&self) -> RuleSetFile {
        RuleSetFile {
            fallback_weight: self.fallback_weight,
            rules: self.rules.iter().map(|r| r.rule.clone()).collect(),
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_file())?)
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn fallback_weight(&self) -> f64 {
        self.fallback_weight
    }

    /// Weight of a category; the fallback weight for categories without a rule
    pub fn weight_of(&self, category: Category) -> f64 {
        self.rules
            .iter()
            .find(|r| r.category() == category)
            .map_or(self.fallback_weight, CompiledRule::weight)
    }

    /// Largest weight in the set, fallback included
    pub fn max_weight(&self) -> f64 {
        self.rules
            .iter()
            .map(CompiledRule::weight)
            .fold(self.fallback_weight, f64::max)
    }
}

impl Serialize for RuleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_file().serialize(serializer)
    }
}

/// Built-in rules, in evaluation order
fn builtin_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            Category::Conference,
            [r"\b(conference|keynote|summit|talk|presentation|meetup|symposium)\b|google developers|microsoft developer|strange loop"],
        )
        .with_weight(1.2),
        CategoryRule::new(
            Category::Tutorial,
            [
                r"\b(tutorial|walkthrough|step[- ]by[- ]step|how to|hands[- ]on)\b",
                r"\b(build|building|create|setup|set up|install|implement|from scratch|beginners?)\b",
            ],
        )
        .with_weight(1.1),
        CategoryRule::new(
            Category::Education,
            [r"\b(tutorial|how to|learn|learning|course|lesson|lecture|guide|explained|introduction)\b|khan academy|coursera|udemy|edx|3blue1brown"],
        )
        .with_weight(1.0),
        CategoryRule::new(
            Category::Tech,
            [r"\b(programming|coding|software|tech|developer|development|javascript|python|rust|linux)\b|fireship|traversy media|the coding train|tech lead"],
        )
        .with_weight(1.0),
        CategoryRule::new(
            Category::Productivity,
            [r"\b(productivity|business|entrepreneur|success|self[- ]improvement|habits?|time management)\b|thomas frank|matt d'avella|ali abdaal"],
        )
        .with_weight(0.9),
        CategoryRule::new(
            Category::Entertainment,
            [r"\b(funny|comedy|gaming|vlog|entertainment|reaction|prank|highlights)\b|pewdiepie|markiplier|jacksepticeye"],
        )
        .with_weight(0.8),
        CategoryRule::new(Category::Short, Vec::<String>::new())
            .with_duration(DurationRange::at_most(599))
            .with_weight(0.6),
        CategoryRule::new(Category::Long, Vec::<String>::new())
            .with_duration(DurationRange::at_least(3601))
            .with_weight(0.7),
    ]
}
