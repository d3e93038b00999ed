//! Persistence seam
//!
//! The scheduling core only reads through [`AppointmentStore`] and writes
//! after a clean conflict check. A relational implementation should also
//! carry an exclusion constraint on (doctor, active status, time range);
//! [`crate::AppointmentService`] already serialises check-and-write per
//! doctor.

use crate::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, DoctorId, PatientId,
    PatientRecord, StaffRecord,
};
use crate::error::StoreError;
use crate::interval::TimeInterval;
use chrono::{DateTime, Utc};
use mediflow_rbac::UserId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Filters for listing appointments. Date bounds are inclusive and apply to
/// the start time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentFilter {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl AppointmentFilter {
    pub fn matches(&self, apt: &Appointment) -> bool {
        self.patient_id.map_or(true, |id| apt.patient_id == id)
            && self.doctor_id.map_or(true, |id| apt.doctor_id == id)
            && self.status.map_or(true, |status| apt.status == status)
            && self.date_from.map_or(true, |from| apt.start_time >= from)
            && self.date_to.map_or(true, |to| apt.start_time <= to)
    }
}

pub trait AppointmentStore: Send + Sync {
    fn fetch_doctor(&self, id: DoctorId) -> Result<Option<StaffRecord>, StoreError>;

    fn fetch_patient(&self, id: PatientId) -> Result<Option<PatientRecord>, StoreError>;

    /// The doctor's scheduled and confirmed appointments, earliest first.
    /// `within` narrows to appointments overlapping the range; it is an
    /// optimisation, callers re-filter.
    fn fetch_active_appointments_for_doctor(
        &self,
        doctor_id: DoctorId,
        within: Option<TimeInterval>,
    ) -> Result<Vec<Appointment>, StoreError>;

    fn fetch_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError>;

    fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    /// Insert and assign an id
    fn persist_appointment(&self, draft: AppointmentDraft) -> Result<Appointment, StoreError>;

    /// Overwrite an existing appointment
    fn save_appointment(&self, appointment: &Appointment) -> Result<(), StoreError>;

    /// Hard delete. Returns whether anything was removed.
    fn delete_appointment(&self, id: AppointmentId) -> Result<bool, StoreError>;
}

/// Seed data for an [`InMemoryStore`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub staff: Vec<StaffRecord>,
    pub patients: Vec<PatientRecord>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Default)]
struct State {
    staff: HashMap<UserId, StaffRecord>,
    patients: HashMap<PatientId, PatientRecord>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    next_id: u64,
}

/// Reference store for tests and tooling
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let store = InMemoryStore::new();
        {
            // Freshly built, cannot be poisoned
            let mut state = match store.state.write() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            for staff in fixture.staff {
                state.staff.insert(staff.id, staff);
            }
            for patient in fixture.patients {
                state.patients.insert(patient.id, patient);
            }
            for apt in fixture.appointments {
                state.next_id = state.next_id.max(apt.id.0);
                state.appointments.insert(apt.id, apt);
            }
        }
        store
    }

    pub fn add_staff(&self, staff: StaffRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("staff"))?;
        state.staff.insert(staff.id, staff);
        Ok(())
    }

    pub fn add_patient(&self, patient: PatientRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("patients"))?;
        state.patients.insert(patient.id, patient);
        Ok(())
    }

    /// Insert an appointment with a caller-chosen id, bypassing every check
    pub fn seed_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("appointments"))?;
        state.next_id = state.next_id.max(appointment.id.0);
        state.appointments.insert(appointment.id, appointment);
        Ok(())
    }

    pub fn appointment_count(&self) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("appointments"))?;
        Ok(state.appointments.len())
    }
}

impl AppointmentStore for InMemoryStore {
    fn fetch_doctor(&self, id: DoctorId) -> Result<Option<StaffRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("staff"))?;
        Ok(state.staff.get(&id).cloned())
    }

    fn fetch_patient(&self, id: PatientId) -> Result<Option<PatientRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("patients"))?;
        Ok(state.patients.get(&id).cloned())
    }

    fn fetch_active_appointments_for_doctor(
        &self,
        doctor_id: DoctorId,
        within: Option<TimeInterval>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("appointments"))?;

        let mut active: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|apt| apt.doctor_id == doctor_id && apt.is_active())
            .filter(|apt| within.map_or(true, |range| apt.interval().overlaps(&range)))
            .cloned()
            .collect();
        active.sort_by_key(|apt| (apt.start_time, apt.id));

        Ok(active)
    }

    fn fetch_appointment(&self, id: AppointmentId) -> Result<Option<Appointment>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("appointments"))?;
        Ok(state.appointments.get(&id).cloned())
    }

    fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned("appointments"))?;
        Ok(state
            .appointments
            .values()
            .filter(|apt| filter.matches(apt))
            .cloned()
            .collect())
    }

    fn persist_appointment(&self, draft: AppointmentDraft) -> Result<Appointment, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("appointments"))?;
        state.next_id += 1;
        let appointment = draft.into_appointment(AppointmentId(state.next_id));
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn save_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("appointments"))?;
        match state.appointments.get_mut(&appointment.id) {
            Some(stored) => {
                *stored = appointment.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "appointment {} does not exist",
                appointment.id
            ))),
        }
    }

    fn delete_appointment(&self, id: AppointmentId) -> Result<bool, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned("appointments"))?;
        Ok(state.appointments.remove(&id).is_some())
    }
}
