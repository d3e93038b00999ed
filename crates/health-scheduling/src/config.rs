//! Scheduling configuration
//!
//! Loaded once at startup. Every field has a default matching the clinic's
//! standard hours, so an empty JSON object is a valid configuration.

use chrono::{NaiveTime, Timelike};
use mediflow_validation::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a slot whose end runs past closing time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// Keep the slot but mark it unavailable
    #[default]
    FlagUnavailable,
    /// Keep the slot; availability depends only on conflicts
    Keep,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid scheduling config: {0}")]
    Invalid(String),
    #[error("scheduling config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read scheduling config: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Start of the working window (clinic-local)
    pub working_start: NaiveTime,
    /// End of the working window (clinic-local, exclusive for slot starts)
    pub working_end: NaiveTime,
    /// Step between generated slot starts, independent of requested duration
    pub slot_stride_minutes: u32,
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
    /// Clinic timezone as a fixed offset from UTC; defines the calendar day
    pub utc_offset_minutes: i32,
    pub overrun_policy: OverrunPolicy,
    /// Refuse to book or move appointments into the past
    pub reject_past_appointments: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        SchedulingConfig {
            working_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            working_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_stride_minutes: 30,
            min_duration_minutes: MIN_DURATION_MINUTES,
            max_duration_minutes: MAX_DURATION_MINUTES,
            utc_offset_minutes: 0,
            overrun_policy: OverrunPolicy::FlagUnavailable,
            reject_past_appointments: true,
        }
    }
}

impl SchedulingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_stride_minutes == 0 {
            return Err(ConfigError::Invalid("slot_stride_minutes must be positive".into()));
        }
        if self.working_start >= self.working_end {
            return Err(ConfigError::Invalid(format!(
                "working_start {} must be before working_end {}",
                self.working_start, self.working_end
            )));
        }
        let window_minutes = (self.working_end - self.working_start).num_minutes();
        if i64::from(self.slot_stride_minutes) > window_minutes {
            return Err(ConfigError::Invalid(format!(
                "slot_stride_minutes {} exceeds the {} minute working window",
                self.slot_stride_minutes, window_minutes
            )));
        }
        if self.min_duration_minutes == 0 {
            return Err(ConfigError::Invalid("min_duration_minutes must be positive".into()));
        }
        if self.min_duration_minutes > self.max_duration_minutes {
            return Err(ConfigError::Invalid(format!(
                "min_duration_minutes {} exceeds max_duration_minutes {}",
                self.min_duration_minutes, self.max_duration_minutes
            )));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes {} is outside +/-24h",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SchedulingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Number of slots a day yields: one per stride tick inside the window
    pub fn slots_per_day(&self) -> usize {
        let window = u64::from(
            self.working_end
                .num_seconds_from_midnight()
                .saturating_sub(self.working_start.num_seconds_from_midnight()),
        );
        let stride = u64::from(self.slot_stride_minutes.max(1)) * 60;
        usize::try_from(window.div_ceil(stride)).unwrap_or(usize::MAX)
    }
}
