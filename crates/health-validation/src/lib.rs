//! MediFlow Input Validation
//!
//! Pure-Rust validators used before any scheduling or authorization logic
//! runs. Validators never short-circuit on the first problem: each returns a
//! [`ValidationResult`] that accumulates every field error, so callers can
//! report all of them at once.
//!
//! Provides validators for:
//! - Appointment durations (bounded minutes)
//! - Free-text fields (reason for visit, notes)
//! - Time intervals and not-in-the-past checks against an injected clock
//! - Pagination parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest bookable appointment, in minutes
pub const MIN_DURATION_MINUTES: u32 = 15;

/// Longest bookable appointment, in minutes
pub const MAX_DURATION_MINUTES: u32 = 240;

/// Minimum length of the reason for visit
pub const REASON_MIN_CHARS: usize = 3;

/// Maximum length of the reason for visit
pub const REASON_MAX_CHARS: usize = 500;

/// Maximum length of free-form appointment notes
pub const NOTES_MAX_CHARS: usize = 2000;

/// Largest page a list query may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Specific validation error codes for programmatic handling
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    Required,
    InvalidFormat,
    OutOfRange,
    TooLong,
    TooShort,
    InvalidInterval,
    InThePast,
    NothingToUpdate,
}

/// Validation error with detailed context
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ValidationErrorCode,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({:?})", self.field, self.message, self.code)
    }
}

/// One or more validation failures, surfaced to the caller as a single error
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Build from a single field error
    pub fn single(field: &str, message: &str, code: ValidationErrorCode) -> Self {
        ValidationErrors(vec![ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            code,
        }])
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether any error carries the given code
    pub fn has_code(&self, code: ValidationErrorCode) -> bool {
        self.0.iter().any(|e| e.code == code)
    }

    /// Whether any error is reported against the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Validation result that can accumulate multiple errors
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, field: &str, message: &str, code: ValidationErrorCode) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
            code,
        });
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

/// Validate an appointment duration
///
/// Duration must be positive and within `[min, max]` minutes (inclusive).
pub fn validate_duration_minutes(minutes: i64, min: u32, max: u32) -> ValidationResult {
    let mut result = ValidationResult::new();

    if minutes <= 0 {
        result.add_error(
            "duration_minutes",
            "Duration must be a positive number of minutes",
            ValidationErrorCode::OutOfRange,
        );
        return result;
    }

    if minutes < i64::from(min) || minutes > i64::from(max) {
        result.add_error(
            "duration_minutes",
            &format!("Duration must be between {} and {} minutes", min, max),
            ValidationErrorCode::OutOfRange,
        );
    }

    result
}

/// Validate a required free-text field by character count
pub fn validate_text_length(value: &str, field: &str, min: usize, max: usize) -> ValidationResult {
    let mut result = ValidationResult::new();

    if value.trim().is_empty() {
        result.add_error(field, &format!("{} is required", field), ValidationErrorCode::Required);
        return result;
    }

    let len = value.chars().count();
    if len < min {
        result.add_error(
            field,
            &format!("{} must be at least {} characters", field, min),
            ValidationErrorCode::TooShort,
        );
    }
    if len > max {
        result.add_error(
            field,
            &format!("{} cannot exceed {} characters", field, max),
            ValidationErrorCode::TooLong,
        );
    }

    result
}

/// Validate the reason for visit (3-500 characters)
pub fn validate_reason(reason: &str) -> ValidationResult {
    validate_text_length(reason, "reason", REASON_MIN_CHARS, REASON_MAX_CHARS)
}

/// Validate optional appointment notes (at most 2000 characters)
pub fn validate_notes(notes: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(notes) = notes {
        if notes.chars().count() > NOTES_MAX_CHARS {
            result.add_error(
                "notes",
                &format!("notes cannot exceed {} characters", NOTES_MAX_CHARS),
                ValidationErrorCode::TooLong,
            );
        }
    }

    result
}

/// Validate that `start` is not earlier than `now`
pub fn validate_not_in_past(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    field: &str,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if start < now {
        result.add_error(
            field,
            "Appointment date cannot be in the past",
            ValidationErrorCode::InThePast,
        );
    }

    result
}

/// Validate that an interval ends strictly after it starts
pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult::new();

    if end <= start {
        result.add_error(
            "end_time",
            &format!("End time {} must be after start time {}", end, start),
            ValidationErrorCode::InvalidInterval,
        );
    }

    result
}

/// Validate 1-based pagination parameters
pub fn validate_page(page: u32, page_size: u32) -> ValidationResult {
    let mut result = ValidationResult::new();

    if page == 0 {
        result.add_error("page", "Page numbers start at 1", ValidationErrorCode::OutOfRange);
    }
    if page_size == 0 {
        result.add_error(
            "page_size",
            "Page size must be greater than 0",
            ValidationErrorCode::OutOfRange,
        );
    }
    if page_size > MAX_PAGE_SIZE {
        result.add_error(
            "page_size",
            &format!("Page size cannot exceed {}", MAX_PAGE_SIZE),
            ValidationErrorCode::OutOfRange,
        );
    }

    result
}
