//! Half-open time intervals

use chrono::{DateTime, Duration, Utc};
use mediflow_validation::{
    validate_duration_minutes, validate_interval, ValidationErrorCode, ValidationErrors,
};
use serde::{Deserialize, Serialize};

/// `[start, end)`: the end instant is not part of the range, so back-to-back
/// intervals do not overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Validated constructor: `end` must be strictly after `start`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        validate_interval(start, end).into_result()?;
        Ok(TimeInterval { start, end })
    }

    /// Validated constructor from a start and a positive length in minutes.
    /// An end past the representable range is an `OutOfRange` error on
    /// `start_time`.
    pub fn starting_at(
        start: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Result<Self, ValidationErrors> {
        validate_duration_minutes(i64::from(duration_minutes), 1, u32::MAX).into_result()?;
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
            .ok_or_else(|| {
                ValidationErrors::single(
                    "start_time",
                    "Appointment end is out of range",
                    ValidationErrorCode::OutOfRange,
                )
            })?;
        Ok(TimeInterval { start, end })
    }

    /// Unchecked constructor for already-validated records
    pub(crate) fn spanning(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeInterval { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `s1 < e2 && s2 < e1`. Covers starting inside, ending inside and full
    /// containment in either direction; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
