//! Shared clinic fixture
//!
//! Staff 1-3 are doctors, 4 a nurse, 5 a receptionist, 6 an account with a
//! retired role token. Appointments are on 2024-03-04.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mediflow_rbac::{Caller, Guard, Role, UserId};
use mediflow_scheduling::{AppointmentService, FixedClock, Fixture, InMemoryStore, SchedulingConfig};
use std::sync::Arc;

pub const DR_REYES: UserId = UserId(1);
pub const DR_OKAFOR: UserId = UserId(2);
pub const DR_LINDQVIST: UserId = UserId(3);
pub const NURSE_SILVA: UserId = UserId(4);
pub const RETIRED_ROLE_ACCOUNT: UserId = UserId(6);

pub const CLINIC_JSON: &str = r#"{
    "staff": [
        {"id": 1, "username": "dr.reyes", "role": "doctor"},
        {"id": 2, "username": "dr.okafor", "role": "doctor"},
        {"id": 3, "username": "dr.lindqvist", "role": "doctor"},
        {"id": 4, "username": "n.silva", "role": "nurse"},
        {"id": 5, "username": "front.desk", "role": "receptionist"},
        {"id": 6, "username": "old.account", "role": "superuser"}
    ],
    "patients": [
        {"id": 100, "first_name": "Ana", "last_name": "Cruz"},
        {"id": 101, "first_name": "Tomas", "last_name": "Berg"},
        {"id": 102, "first_name": "Leila", "last_name": "Haddad"}
    ],
    "appointments": [
        {
            "id": 1, "patient_id": 100, "doctor_id": 1,
            "start_time": "2024-03-04T09:00:00Z", "duration_minutes": 30,
            "appointment_type": "consultation", "reason": "Persistent cough",
            "status": "confirmed",
            "created_at": "2024-02-20T10:00:00Z", "updated_at": "2024-02-20T10:00:00Z"
        },
        {
            "id": 2, "patient_id": 101, "doctor_id": 1,
            "start_time": "2024-03-04T11:00:00Z", "duration_minutes": 90,
            "appointment_type": "procedure", "reason": "Minor excision",
            "notes": "Fasting not required",
            "status": "scheduled",
            "created_at": "2024-02-21T10:00:00Z", "updated_at": "2024-02-21T10:00:00Z"
        },
        {
            "id": 3, "patient_id": 102, "doctor_id": 1,
            "start_time": "2024-03-04T14:00:00Z", "duration_minutes": 30,
            "appointment_type": "follow_up", "reason": "Lab results review",
            "status": "cancelled",
            "created_at": "2024-02-22T10:00:00Z", "updated_at": "2024-02-23T10:00:00Z"
        },
        {
            "id": 4, "patient_id": 100, "doctor_id": 2,
            "start_time": "2024-03-04T09:00:00Z", "duration_minutes": 60,
            "appointment_type": "routine_checkup", "reason": "Annual physical",
            "status": "scheduled",
            "created_at": "2024-02-22T10:00:00Z", "updated_at": "2024-02-22T10:00:00Z"
        }
    ]
}"#;

pub fn clinic_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

pub fn clinic_fixture() -> Fixture {
    serde_json::from_str(CLINIC_JSON).unwrap()
}

/// Service over the clinic fixture with the clock fixed a week before the
/// clinic day
pub fn clinic_service(config: SchedulingConfig) -> AppointmentService<InMemoryStore> {
    let now = Utc.with_ymd_and_hms(2024, 2, 26, 8, 0, 0).unwrap();
    AppointmentService::with_clock(
        InMemoryStore::from_fixture(clinic_fixture()),
        Guard::default(),
        config,
        Arc::new(FixedClock(now)),
    )
}

pub fn staff(role: Role) -> Caller {
    Caller::new(900u64, role)
}
