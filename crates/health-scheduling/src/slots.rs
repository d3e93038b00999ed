//! Availability slot generator
//!
//! One slot per stride tick inside `[working_start, working_end)` on the
//! requested clinic-local day. The stride does not depend on the requested
//! duration, and the loop bound is not shortened by it: a slot near closing
//! time may end after `working_end`. What happens to such a slot is decided
//! by [`OverrunPolicy`].

use crate::appointment::{Appointment, DoctorId};
use crate::config::{OverrunPolicy, SchedulingConfig};
use crate::interval::TimeInterval;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    /// The slot ends after the working window closes
    pub overruns_close: bool,
}

/// Availability answer for one doctor and day
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub slots: Vec<TimeSlot>,
}

impl Availability {
    pub fn available_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.available)
    }
}

/// Convert a clinic-local wall-clock time on `date` to UTC. `None` when the
/// instant is outside chrono's representable range.
pub fn clinic_instant(
    date: NaiveDate,
    time: NaiveTime,
    utc_offset_minutes: i32,
) -> Option<DateTime<Utc>> {
    let local = date.and_time(time);
    local
        .checked_sub_signed(Duration::minutes(i64::from(utc_offset_minutes)))
        .map(|utc| Utc.from_utc_datetime(&utc))
}

/// Working window for `date`, as UTC instants
pub fn working_window(config: &SchedulingConfig, date: NaiveDate) -> Option<TimeInterval> {
    Some(TimeInterval::spanning(
        clinic_instant(date, config.working_start, config.utc_offset_minutes)?,
        clinic_instant(date, config.working_end, config.utc_offset_minutes)?,
    ))
}

/// Range a store must cover to answer an availability query: from opening
/// until the last slot can end
pub fn lookup_range(
    config: &SchedulingConfig,
    date: NaiveDate,
    duration_minutes: u32,
) -> Option<TimeInterval> {
    let window = working_window(config, date)?;
    let last_end = window
        .end()
        .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))?;
    Some(TimeInterval::spanning(window.start(), last_end))
}

/// Lazily yields slots, earliest first. Finite; a fresh call recomputes.
#[derive(Clone, Debug)]
pub struct SlotIter {
    next_start: DateTime<Utc>,
    close: DateTime<Utc>,
    stride: Duration,
    duration: Duration,
    busy: Vec<TimeInterval>,
    policy: OverrunPolicy,
}

impl Iterator for SlotIter {
    type Item = TimeSlot;

    fn next(&mut self) -> Option<TimeSlot> {
        if self.next_start >= self.close {
            return None;
        }

        let start_time = self.next_start;
        let end_time = start_time.checked_add_signed(self.duration)?;
        let slot = TimeInterval::spanning(start_time, end_time);

        let overruns_close = end_time > self.close;
        let conflicts = self.busy.iter().any(|busy| busy.overlaps(&slot));
        let available = !conflicts
            && match self.policy {
                OverrunPolicy::FlagUnavailable => !overruns_close,
                OverrunPolicy::Keep => true,
            };

        self.next_start = start_time
            .checked_add_signed(self.stride)
            .unwrap_or(self.close);

        Some(TimeSlot {
            start_time,
            end_time,
            available,
            overruns_close,
        })
    }
}

/// Slots for `doctor_id` on `date`, checking each against the doctor's
/// active appointments. `duration_minutes` must already be validated. A day
/// outside the representable range yields no slots.
pub fn generate_slots<'a>(
    config: &SchedulingConfig,
    doctor_id: DoctorId,
    date: NaiveDate,
    duration_minutes: u32,
    appointments: impl IntoIterator<Item = &'a Appointment>,
) -> SlotIter {
    let (next_start, close) = match working_window(config, date) {
        Some(window) => (window.start(), window.end()),
        None => (DateTime::<Utc>::MAX_UTC, DateTime::<Utc>::MAX_UTC),
    };
    let busy = appointments
        .into_iter()
        .filter(|apt| apt.doctor_id == doctor_id && apt.is_active())
        .map(Appointment::interval)
        .collect();

    SlotIter {
        next_start,
        close,
        stride: Duration::minutes(i64::from(config.slot_stride_minutes.max(1))),
        duration: Duration::minutes(i64::from(duration_minutes)),
        busy,
        policy: config.overrun_policy,
    }
}
