//! MediFlow Test Suite
//!
//! Cross-crate scenario tests:
//! - Access control: every role against the appointment operations
//! - Scheduling: conflict detection and slot generation on realistic calendars
//! - Appointments: booking lifecycle over a JSON clinic fixture

pub mod fixtures;

pub mod appointments;
pub mod scheduling;
