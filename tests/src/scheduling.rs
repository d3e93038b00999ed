//! Scheduling Engine Tests
//!
//! Conflict detection and slot generation against the clinic fixture:
//! - Half-open overlap, boundaries and inactive statuses
//! - Per-doctor isolation
//! - Availability grids, overrun policy and clinic timezone

#[cfg(test)]
mod unit_tests {
    use crate::fixtures::*;
    use chrono::Duration;
    use mediflow_rbac::{Role, UserId};
    use mediflow_scheduling::{
        find_conflict, generate_slots, AppointmentId, AppointmentStore, AppointmentType,
        ConflictOutcome, NewAppointment, OverrunPolicy, PatientId, SchedulingConfig, TimeInterval,
        TimeSlot,
    };
    use proptest::prelude::*;

    fn candidate(hour: u32, minute: u32, minutes: u32) -> TimeInterval {
        TimeInterval::starting_at(at(hour, minute), minutes).unwrap()
    }

    fn fixture_slots(config: &SchedulingConfig, doctor: UserId, minutes: u32) -> Vec<TimeSlot> {
        let fixture = clinic_fixture();
        generate_slots(config, doctor, clinic_day(), minutes, &fixture.appointments).collect()
    }

    #[test]
    fn test_fixture_conflicts() {
        let fixture = clinic_fixture();
        let existing = &fixture.appointments;

        // Inside the 90 minute procedure
        let outcome = find_conflict(DR_REYES, &candidate(11, 30, 15), None, existing);
        assert_eq!(outcome.conflicting_id(), Some(AppointmentId(2)));

        // Right after the confirmed consult
        assert_eq!(
            find_conflict(DR_REYES, &candidate(9, 30, 90), None, existing),
            ConflictOutcome::Clear
        );

        // Over the cancelled follow-up
        assert_eq!(
            find_conflict(DR_REYES, &candidate(14, 0, 30), None, existing),
            ConflictOutcome::Clear
        );

        // Dr Okafor's 09:00 does not block Dr Lindqvist
        assert!(find_conflict(DR_OKAFOR, &candidate(9, 30, 15), None, existing).is_conflict());
        assert!(!find_conflict(DR_LINDQVIST, &candidate(9, 30, 15), None, existing).is_conflict());
    }

    #[test]
    fn test_spanning_candidate_reports_earliest() {
        let fixture = clinic_fixture();
        let outcome = find_conflict(DR_REYES, &candidate(8, 0, 240), None, &fixture.appointments);
        assert_eq!(outcome.conflicting_id(), Some(AppointmentId(1)));
    }

    #[test]
    fn test_availability_grid_thirty_minutes() {
        let slots = fixture_slots(&SchedulingConfig::default(), DR_REYES, 30);

        assert_eq!(slots.len(), 16);
        let busy: Vec<_> = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.start_time)
            .collect();
        assert_eq!(busy, vec![at(9, 0), at(11, 0), at(11, 30), at(12, 0)]);
    }

    #[test]
    fn test_availability_grid_sixty_minutes() {
        let slots = fixture_slots(&SchedulingConfig::default(), DR_REYES, 60);

        let busy: Vec<_> = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.start_time)
            .collect();
        assert_eq!(
            busy,
            vec![at(9, 0), at(10, 30), at(11, 0), at(11, 30), at(12, 0), at(16, 30)]
        );
        assert!(slots.last().unwrap().overruns_close);

        let keep = SchedulingConfig {
            overrun_policy: OverrunPolicy::Keep,
            ..Default::default()
        };
        let last = *fixture_slots(&keep, DR_REYES, 60).last().unwrap();
        assert!(last.available);
        assert!(last.overruns_close);
    }

    #[test]
    fn test_clinic_timezone_moves_the_day() {
        // UTC-5: the clinic day runs 14:00-22:00 UTC, past every booking but
        // the cancelled one
        let config = SchedulingConfig {
            utc_offset_minutes: -300,
            ..Default::default()
        };
        let svc = clinic_service(config);
        let availability = svc
            .availability(&staff(Role::Receptionist), DR_REYES, clinic_day(), 30)
            .unwrap();

        assert_eq!(availability.slots[0].start_time, at(14, 0));
        assert_eq!(availability.available_slots().count(), 16);
    }

    #[test]
    fn test_wider_stride_from_config() {
        let config = SchedulingConfig::from_json_str(
            r#"{"slot_stride_minutes": 60, "working_end": "12:00:00"}"#,
        )
        .unwrap();
        let slots = fixture_slots(&config, DR_OKAFOR, 30);

        let starts: Vec<_> = slots.iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![at(9, 0), at(10, 0), at(11, 0)]);
        assert!(!slots[0].available);
        assert!(slots[1].available);
    }

    #[test]
    fn test_results_recomputed_per_call() {
        let svc = clinic_service(SchedulingConfig::default());
        let receptionist = staff(Role::Receptionist);

        let before = svc.availability(&receptionist, DR_REYES, clinic_day(), 30).unwrap();
        svc.delete(&staff(Role::Admin), AppointmentId(1)).unwrap();
        let after = svc.availability(&receptionist, DR_REYES, clinic_day(), 30).unwrap();

        assert!(!before.slots[0].available);
        assert!(after.slots[0].available);
    }

    proptest! {
        #[test]
        fn prop_service_never_double_books(
            requests in proptest::collection::vec((0i64..16, 15u32..=120), 1..24),
        ) {
            let svc = clinic_service(SchedulingConfig::default());
            let desk = staff(Role::Receptionist);

            for (tick, minutes) in requests {
                let request = NewAppointment {
                    patient_id: PatientId(100),
                    doctor_id: DR_LINDQVIST,
                    start_time: at(9, 0) + Duration::minutes(30 * tick),
                    duration_minutes: minutes,
                    appointment_type: AppointmentType::Consultation,
                    reason: "Walk-in".to_string(),
                    notes: None,
                };
                // Conflicts are expected; only the stored calendar matters
                let _ = svc.create(&desk, request);
            }

            let booked = svc
                .store()
                .fetch_active_appointments_for_doctor(DR_LINDQVIST, None)
                .unwrap();
            prop_assert!(!booked.is_empty());
            for (i, a) in booked.iter().enumerate() {
                for b in &booked[i + 1..] {
                    prop_assert!(
                        !a.interval().overlaps(&b.interval()),
                        "{} overlaps {}",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }
}
