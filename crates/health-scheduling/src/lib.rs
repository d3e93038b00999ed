//! MediFlow Scheduling - appointment conflict detection and availability
//!
//! The pure engine ([`find_conflict`], [`generate_slots`]) works on
//! appointments already fetched into memory and does no I/O. The
//! [`AppointmentService`] wraps it with authorization, validation, doctor and
//! patient lookup, and per-doctor write serialisation over an
//! [`AppointmentStore`].
//!
//! Only `scheduled` and `confirmed` appointments occupy a doctor's calendar.
//! Intervals are half-open, so back-to-back bookings never conflict.
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use mediflow_rbac::UserId;
//! use mediflow_scheduling::{find_conflict, generate_slots, SchedulingConfig, TimeInterval};
//!
//! let config = SchedulingConfig::default();
//! let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//! let slots: Vec<_> = generate_slots(&config, UserId(2), date, 30, &[]).collect();
//! assert_eq!(slots.len(), 16);
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
//! let candidate = TimeInterval::starting_at(start, 30).unwrap();
//! assert!(!find_conflict(UserId(2), &candidate, None, &[]).is_conflict());
//! ```

pub mod appointment;
pub mod config;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod lifecycle;
pub mod page;
pub mod slots;
pub mod store;

pub use appointment::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentPatch, AppointmentStatus,
    AppointmentType, DoctorId, NewAppointment, PatientId, PatientRecord, StaffRecord,
};
pub use config::{ConfigError, OverrunPolicy, SchedulingConfig};
pub use conflict::{find_conflict, ConflictOutcome};
pub use error::{Result, SchedulingError, StoreError};
pub use interval::TimeInterval;
pub use lifecycle::{
    AppointmentService, Clock, ConflictQuery, DoctorLocks, FixedClock, SystemClock,
};
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use slots::{
    clinic_instant, generate_slots, lookup_range, working_window, Availability, SlotIter, TimeSlot,
};
pub use store::{AppointmentFilter, AppointmentStore, Fixture, InMemoryStore};
