//! Realignment configuration.
//!
//! Mirrors the `timing_realignment` block of the pipeline's `config.json`.
//! Every field has a default, so a partial block (or `{}`) is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// Which realigner runs before overlap resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RealignMethod {
    /// Sequential, neighbor-aware search in widening windows.
    TextSearch,
    /// Per-segment sliding-window verification, batchable.
    #[default]
    TimeBased,
}

impl RealignMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextSearch => "text_search",
            Self::TimeBased => "time_based",
        }
    }
}

impl From<String> for RealignMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text_search" => Self::TextSearch,
            "time_based" => Self::TimeBased,
            other => {
                tracing::warn!(method = %other, "Unknown realignment method, using time_based");
                Self::TimeBased
            }
        }
    }
}

impl fmt::Display for RealignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealignConfig {
    /// When false, segments pass through untouched.
    pub enable: bool,

    pub method: RealignMethod,

    /// Minimum spacing between consecutive segments (seconds).
    pub min_gap: f64,

    /// Segments verified concurrently by the time-based realigner.
    pub batch_size: usize,

    pub text_search: TextSearchConfig,

    pub time_based: TimeBasedConfig,
}

impl Default for RealignConfig {
    fn default() -> Self {
        Self {
            enable: true,
            method: RealignMethod::default(),
            min_gap: 0.1,
            batch_size: 10,
            text_search: TextSearchConfig::default(),
            time_based: TimeBasedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSearchConfig {
    /// Padding of the first search window around the segment (seconds).
    pub padding: f64,

    /// Padding of the widest search window (seconds).
    #[serde(alias = "max_expansion")]
    pub expansion: f64,

    /// Number of windows between `padding` and `expansion`.
    pub expansion_attempts: usize,

    /// Minimum similarity to accept a match.
    #[serde(alias = "min_similarity")]
    pub similarity: f64,

    /// Found boundaries moving both ends less than this are ignored (seconds).
    pub adjustment_threshold: f64,

    /// Replace the segment text with the matched probe text on acceptance.
    pub replace_text: bool,
}

impl Default for TextSearchConfig {
    fn default() -> Self {
        Self {
            padding: 0.5,
            expansion: 10.0,
            expansion_attempts: 4,
            similarity: 0.75,
            adjustment_threshold: 0.3,
            replace_text: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBasedConfig {
    /// Largest shift tried in either direction (seconds).
    #[serde(alias = "max_expansion")]
    pub expansion: f64,

    /// Number of shift offsets between 0.5s and `expansion`.
    pub expansion_attempts: usize,

    /// Similarity at which the in-place check or the search stops.
    #[serde(alias = "min_similarity")]
    pub similarity: f64,
}

impl Default for TimeBasedConfig {
    fn default() -> Self {
        Self {
            expansion: 3.0,
            expansion_attempts: 5,
            similarity: 0.75,
        }
    }
}

impl RealignConfig {
    /// Load from a JSON file.
    ///
    /// Accepts either a full pipeline config (the `timing_realignment` object is
    /// used) or a document that is the realignment block itself.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let block = match document.get_mut("timing_realignment") {
            Some(block) => block.take(),
            None => document,
        };
        let config: Self = serde_json::from_value(block)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(ConfigError::invalid("min_gap", "must be a non-negative number"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }

        let ts = &self.text_search;
        check_similarity("text_search.similarity", ts.similarity)?;
        check_positive("text_search.padding", ts.padding)?;
        check_positive("text_search.expansion", ts.expansion)?;
        if ts.padding > ts.expansion {
            return Err(ConfigError::invalid(
                "text_search.padding",
                format!("{} exceeds expansion {}", ts.padding, ts.expansion),
            ));
        }
        if ts.expansion_attempts == 0 {
            return Err(ConfigError::invalid(
                "text_search.expansion_attempts",
                "must be at least 1",
            ));
        }
        if ts.adjustment_threshold.is_nan() || ts.adjustment_threshold < 0.0 {
            return Err(ConfigError::invalid(
                "text_search.adjustment_threshold",
                "must be non-negative",
            ));
        }

        let tb = &self.time_based;
        check_similarity("time_based.similarity", tb.similarity)?;
        check_positive("time_based.expansion", tb.expansion)?;
        if tb.expansion_attempts == 0 {
            return Err(ConfigError::invalid(
                "time_based.expansion_attempts",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn check_similarity(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}
