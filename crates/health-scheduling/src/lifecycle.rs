//! Appointment lifecycle controller
//!
//! Every operation authorizes the caller first, validates input, resolves
//! the referenced doctor and patient, and only then touches interval math or
//! the store. Writes for one doctor are serialised by [`DoctorLocks`] so two
//! overlapping bookings cannot both pass the conflict check.

use crate::appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentPatch, AppointmentStatus, DoctorId,
    NewAppointment, StaffRecord,
};
use crate::config::SchedulingConfig;
use crate::conflict::{find_conflict, ConflictOutcome};
use crate::error::{Result, SchedulingError, StoreError};
use crate::interval::TimeInterval;
use crate::page::{Page, PageRequest};
use crate::slots::{generate_slots, lookup_range, Availability};
use crate::store::{AppointmentFilter, AppointmentStore};
use chrono::{DateTime, NaiveDate, Utc};
use mediflow_rbac::{AuthRequirement, Caller, Guard, Permission, Role};
use mediflow_validation::{
    validate_duration_minutes, validate_not_in_past, validate_notes, validate_reason,
    ValidationErrorCode, ValidationErrors, ValidationResult,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Source of "now" for past-date validation and timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that never moves
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Per-doctor write locks. Different doctors never contend.
#[derive(Debug, Default)]
pub struct DoctorLocks {
    locks: Mutex<HashMap<DoctorId, Arc<Mutex<()>>>>,
}

impl DoctorLocks {
    pub fn lock_for(&self, doctor_id: DoctorId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Poisoned("doctor locks"))?;
        Ok(Arc::clone(locks.entry(doctor_id).or_default()))
    }
}

/// Read-only conflict question for one doctor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictQuery {
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub exclude_appointment_id: Option<AppointmentId>,
}

pub struct AppointmentService<S> {
    store: S,
    guard: Guard,
    config: SchedulingConfig,
    clock: Arc<dyn Clock>,
    locks: DoctorLocks,
}

impl<S: AppointmentStore> AppointmentService<S> {
    pub fn new(store: S, guard: Guard, config: SchedulingConfig) -> Self {
        Self::with_clock(store, guard, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: S,
        guard: Guard,
        config: SchedulingConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AppointmentService {
            store,
            guard,
            config,
            clock,
            locks: DoctorLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Book a new appointment. It is always created as scheduled.
    pub fn create(&self, caller: &Caller, request: NewAppointment) -> Result<Appointment> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentCreate))?;

        let now = self.clock.now();
        let mut validation = self.validate_duration(request.duration_minutes);
        validation.merge(validate_reason(&request.reason));
        validation.merge(validate_notes(request.notes.as_deref()));
        if self.config.reject_past_appointments {
            validation.merge(validate_not_in_past(request.start_time, now, "start_time"));
        }
        validation.into_result()?;

        if self.store.fetch_patient(request.patient_id)?.is_none() {
            return Err(SchedulingError::not_found("Patient", request.patient_id));
        }
        self.require_doctor(request.doctor_id)?;

        let candidate = TimeInterval::starting_at(request.start_time, request.duration_minutes)?;

        let lock = self.locks.lock_for(request.doctor_id)?;
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.ensure_free(request.doctor_id, &candidate, None)?;

        let appointment = self.store.persist_appointment(AppointmentDraft {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            appointment_type: request.appointment_type,
            reason: request.reason,
            notes: request.notes,
            status: AppointmentStatus::Scheduled,
            created_at: now,
        })?;

        info!(
            user = %caller.id,
            appointment = %appointment.id,
            doctor = %appointment.doctor_id,
            patient = %appointment.patient_id,
            "APPOINTMENT_CREATED"
        );
        Ok(appointment)
    }

    /// Apply a partial update. Moving the appointment in time re-runs the
    /// conflict check, excluding the appointment itself, while it stays
    /// active.
    pub fn update(
        &self,
        caller: &Caller,
        id: AppointmentId,
        patch: AppointmentPatch,
    ) -> Result<Appointment> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentUpdate))?;

        if patch.is_empty() {
            return Err(ValidationErrors::single(
                "patch",
                "No fields to update",
                ValidationErrorCode::NothingToUpdate,
            )
            .into());
        }

        let now = self.clock.now();
        let mut validation = ValidationResult::new();
        if let Some(duration) = patch.duration_minutes {
            validation.merge(self.validate_duration(duration));
        }
        if let Some(reason) = &patch.reason {
            validation.merge(validate_reason(reason));
        }
        validation.merge(validate_notes(patch.notes.as_deref()));
        if let (Some(start), true) = (patch.start_time, self.config.reject_past_appointments) {
            validation.merge(validate_not_in_past(start, now, "start_time"));
        }
        validation.into_result()?;

        let doctor_id = self.fetch_existing(id)?.doctor_id;
        let lock = self.locks.lock_for(doctor_id)?;
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Re-read under the lock; the record may have moved meanwhile
        let current = self.fetch_existing(id)?;

        if let Some(next) = patch.status {
            if !current.status.can_transition_to(next) {
                return Err(SchedulingError::InvalidTransition {
                    from: current.status,
                    to: next,
                });
            }
        }

        let reschedules = patch.reschedules(&current);
        let mut updated = current;
        patch.apply(&mut updated, now);

        if reschedules && updated.is_active() {
            let candidate =
                TimeInterval::starting_at(updated.start_time, updated.duration_minutes)?;
            self.ensure_free(updated.doctor_id, &candidate, Some(updated.id))?;
        }

        self.store.save_appointment(&updated)?;

        info!(
            user = %caller.id,
            appointment = %updated.id,
            status = %updated.status,
            rescheduled = reschedules,
            "APPOINTMENT_UPDATED"
        );
        Ok(updated)
    }

    /// Hard delete, admins and doctors only
    pub fn delete(&self, caller: &Caller, id: AppointmentId) -> Result<()> {
        self.guard.authorize(caller, &AuthRequirement::appointment_deleters())?;

        let doctor_id = self.fetch_existing(id)?.doctor_id;
        let lock = self.locks.lock_for(doctor_id)?;
        let _held = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.store.delete_appointment(id)? {
            return Err(SchedulingError::not_found("Appointment", id));
        }

        info!(user = %caller.id, appointment = %id, "APPOINTMENT_DELETED");
        Ok(())
    }

    pub fn get(&self, caller: &Caller, id: AppointmentId) -> Result<Appointment> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentRead))?;
        self.fetch_existing(id)
    }

    /// Filtered listing, newest start first
    pub fn list(
        &self,
        caller: &Caller,
        filter: &AppointmentFilter,
        request: PageRequest,
    ) -> Result<Page<Appointment>> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentRead))?;
        request.validate()?;

        let mut appointments = self.store.list_appointments(filter)?;
        appointments.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));

        Ok(Page::slice(appointments, request))
    }

    /// Would `query` collide with one of the doctor's active appointments?
    pub fn check_conflict(
        &self,
        caller: &Caller,
        query: &ConflictQuery,
    ) -> Result<ConflictOutcome> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentRead))?;
        self.validate_duration(query.duration_minutes).into_result()?;
        self.require_doctor(query.doctor_id)?;

        let candidate = TimeInterval::starting_at(query.start_time, query.duration_minutes)?;
        let existing = self
            .store
            .fetch_active_appointments_for_doctor(query.doctor_id, Some(candidate))?;

        Ok(find_conflict(
            query.doctor_id,
            &candidate,
            query.exclude_appointment_id,
            &existing,
        ))
    }

    /// Bookable slots for `doctor_id` on the clinic-local `date`
    pub fn availability(
        &self,
        caller: &Caller,
        doctor_id: DoctorId,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> Result<Availability> {
        self.guard
            .authorize(caller, &AuthRequirement::permission(Permission::AppointmentRead))?;
        self.validate_duration(duration_minutes).into_result()?;
        self.require_doctor(doctor_id)?;

        let range = lookup_range(&self.config, date, duration_minutes).ok_or_else(|| {
            ValidationErrors::single(
                "date",
                "Date is out of range",
                ValidationErrorCode::OutOfRange,
            )
        })?;
        let existing = self
            .store
            .fetch_active_appointments_for_doctor(doctor_id, Some(range))?;
        debug!(
            doctor = %doctor_id,
            %date,
            duration_minutes,
            busy = existing.len(),
            "generating slots"
        );

        let mut slots = Vec::with_capacity(self.config.slots_per_day());
        slots.extend(generate_slots(&self.config, doctor_id, date, duration_minutes, &existing));

        Ok(Availability {
            doctor_id,
            date,
            duration_minutes,
            slots,
        })
    }

    fn validate_duration(&self, minutes: u32) -> ValidationResult {
        validate_duration_minutes(
            i64::from(minutes),
            self.config.min_duration_minutes,
            self.config.max_duration_minutes,
        )
    }

    /// A doctor that is missing or holds another role is reported as not found
    fn require_doctor(&self, doctor_id: DoctorId) -> Result<StaffRecord> {
        match self.store.fetch_doctor(doctor_id)? {
            Some(staff) if matches!(staff.role.parse::<Role>(), Ok(Role::Doctor)) => Ok(staff),
            _ => Err(SchedulingError::not_found("Doctor", doctor_id)),
        }
    }

    fn fetch_existing(&self, id: AppointmentId) -> Result<Appointment> {
        self.store
            .fetch_appointment(id)?
            .ok_or_else(|| SchedulingError::not_found("Appointment", id))
    }

    /// Caller must hold the doctor's lock
    fn ensure_free(
        &self,
        doctor_id: DoctorId,
        candidate: &TimeInterval,
        exclude: Option<AppointmentId>,
    ) -> Result<()> {
        let existing = self
            .store
            .fetch_active_appointments_for_doctor(doctor_id, Some(*candidate))?;

        match find_conflict(doctor_id, candidate, exclude, &existing) {
            ConflictOutcome::Clear => Ok(()),
            ConflictOutcome::Conflict {
                appointment_id,
                interval,
            } => Err(SchedulingError::Conflict {
                appointment_id,
                start: interval.start(),
                end: interval.end(),
            }),
        }
    }
}
