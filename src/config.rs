use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Whether dictation works on one sentence or two adjacent sentences at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GroupingMode {
    #[default]
    Single,
    Pair,
}

impl GroupingMode {
    /// Navigation step and number of sentences per dictation unit
    pub fn stride(self) -> usize {
        match self {
            GroupingMode::Single => 1,
            GroupingMode::Pair => 2,
        }
    }
}

impl TryFrom<u8> for GroupingMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GroupingMode::Single),
            2 => Ok(GroupingMode::Pair),
            other => Err(ConfigError::InvalidGroupingMode(other)),
        }
    }
}

impl From<GroupingMode> for u8 {
    fn from(mode: GroupingMode) -> Self {
        mode.stride() as u8
    }
}

/// Settings consumed by the session and playback layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    pub grouping_mode: GroupingMode,
    /// Total plays per play request, including the first
    pub repeat_count: u32,
    /// Seconds trimmed from a segment end to avoid bleeding into the next sentence
    pub segment_end_padding: f64,
    /// Boundary watch polling period
    pub boundary_poll_interval_ms: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            grouping_mode: GroupingMode::Single,
            repeat_count: 3,
            segment_end_padding: 0.1,
            boundary_poll_interval_ms: 50,
        }
    }
}

impl DictationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_count == 0 {
            return Err(ConfigError::InvalidRepeatCount);
        }
        if !self.segment_end_padding.is_finite() || self.segment_end_padding < 0.0 {
            return Err(ConfigError::InvalidPadding(self.segment_end_padding));
        }
        if self.boundary_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.boundary_poll_interval_ms)
    }

    /// Load and validate a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DictationConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
