//! Time-interval conflict detector
//!
//! Pure and synchronous: callers fetch the doctor's appointments first and
//! validate the candidate interval before asking.

use crate::appointment::{Appointment, AppointmentId, DoctorId};
use crate::interval::TimeInterval;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of a conflict check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConflictOutcome {
    Clear,
    Conflict {
        appointment_id: AppointmentId,
        interval: TimeInterval,
    },
}

impl ConflictOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConflictOutcome::Conflict { .. })
    }

    pub fn conflicting_id(&self) -> Option<AppointmentId> {
        match self {
            ConflictOutcome::Clear => None,
            ConflictOutcome::Conflict { appointment_id, .. } => Some(*appointment_id),
        }
    }
}

/// Check `candidate` against `existing` for one doctor.
///
/// Only active appointments belonging to `doctor_id` take part, and
/// `exclude` (the appointment being rescheduled) never conflicts with
/// itself. When several appointments overlap, the one with the earliest
/// start is reported, ties broken by lowest id.
pub fn find_conflict<'a>(
    doctor_id: DoctorId,
    candidate: &TimeInterval,
    exclude: Option<AppointmentId>,
    existing: impl IntoIterator<Item = &'a Appointment>,
) -> ConflictOutcome {
    let first = existing
        .into_iter()
        .filter(|apt| apt.doctor_id == doctor_id)
        .filter(|apt| apt.is_active())
        .filter(|apt| Some(apt.id) != exclude)
        .filter(|apt| apt.interval().overlaps(candidate))
        .min_by_key(|apt| (apt.start_time, apt.id));

    match first {
        Some(apt) => {
            debug!(doctor = %doctor_id, %candidate, conflicting = %apt.id, "conflict found");
            ConflictOutcome::Conflict {
                appointment_id: apt.id,
                interval: apt.interval(),
            }
        }
        None => ConflictOutcome::Clear,
    }
}
