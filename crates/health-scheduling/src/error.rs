//! Scheduling errors
//!
//! Every error is scoped to one request and terminal for it; nothing here is
//! retried by the core.

use crate::appointment::{AppointmentId, AppointmentStatus};
use chrono::{DateTime, Utc};
use mediflow_rbac::AuthError;
use mediflow_validation::ValidationErrors;

/// Persistence-layer failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// Malformed input: non-positive or out-of-range duration, bad text
    /// fields, past start times
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Candidate overlaps an active appointment; correct the input and retry
    #[error(
        "Doctor already has an appointment at this time \
         (appointment {appointment_id}, {start} - {end})"
    )]
    Conflict {
        appointment_id: AppointmentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error(transparent)]
    PermissionDenied(#[from] AuthError),

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SchedulingError {
    pub(crate) fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        SchedulingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// HTTP-equivalent status for route layers
    pub fn status_code(&self) -> u16 {
        match self {
            SchedulingError::Validation(_) | SchedulingError::InvalidTransition { .. } => 422,
            SchedulingError::NotFound { .. } => 404,
            SchedulingError::Conflict { .. } => 409,
            SchedulingError::PermissionDenied(_) => 403,
            SchedulingError::Storage(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
