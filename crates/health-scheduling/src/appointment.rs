//! Appointment records and the staff/patient records they reference

use crate::interval::TimeInterval;
use chrono::{DateTime, Duration, Utc};
use derive_more::{Display, From};
use mediflow_rbac::UserId;
use serde::{Deserialize, Serialize};

/// Doctors are staff accounts holding the doctor role
pub type DoctorId = UserId;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
pub struct AppointmentId(pub u64);

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
pub struct PatientId(pub u64);

/// Appointment status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether the appointment occupies the doctor's calendar
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    /// Permitted status changes. Re-setting the current status is a no-op
    /// and always allowed.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if *self == next {
            return true;
        }

        match self {
            Scheduled => matches!(next, Confirmed | InProgress | Cancelled | NoShow),
            Confirmed => matches!(next, InProgress | Cancelled | NoShow),
            InProgress => matches!(next, Completed),
            Completed | Cancelled | NoShow => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of visit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    Consultation,
    FollowUp,
    Emergency,
    RoutineCheckup,
    Vaccination,
    Procedure,
    Telemedicine,
}

/// A booked appointment: the unit under conflict analysis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Saturates at the latest representable instant
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Half-open `[start_time, end_time)`
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::spanning(self.start_time, self.end_time())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// An appointment about to be persisted; the store assigns the id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl AppointmentDraft {
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            appointment_type: self.appointment_type,
            reason: self.reason,
            notes: self.notes,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Booking request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    pub reason: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub appointment_type: Option<AppointmentType>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.duration_minutes.is_none()
            && self.appointment_type.is_none()
            && self.reason.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }

    /// Whether applying the patch moves the appointment in time
    pub fn reschedules(&self, current: &Appointment) -> bool {
        self.start_time.is_some_and(|t| t != current.start_time)
            || self.duration_minutes.is_some_and(|d| d != current.duration_minutes)
    }

    pub fn apply(self, appointment: &mut Appointment, now: DateTime<Utc>) {
        if let Some(start_time) = self.start_time {
            appointment.start_time = start_time;
        }
        if let Some(duration) = self.duration_minutes {
            appointment.duration_minutes = duration;
        }
        if let Some(kind) = self.appointment_type {
            appointment.appointment_type = kind;
        }
        if let Some(reason) = self.reason {
            appointment.reason = reason;
        }
        if let Some(notes) = self.notes {
            appointment.notes = Some(notes);
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        appointment.updated_at = now;
    }
}

/// Staff account as seen by scheduling
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: UserId,
    pub username: String,
    /// Raw stored role token
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
