//! Appointment Lifecycle Tests
//!
//! Booking, rescheduling, status changes and listing through the service:
//! - Doctor and patient resolution before any interval math
//! - Conflicts against existing bookings, with the reschedule excluded
//! - Status transitions and their effect on the calendar
//! - Filtered, paginated listing

#[cfg(test)]
mod unit_tests {
    use crate::fixtures::*;
    use chrono::{TimeZone, Utc};
    use mediflow_rbac::{Role, UserId};
    use mediflow_scheduling::{
        AppointmentFilter, AppointmentId, AppointmentPatch, AppointmentStatus, AppointmentType,
        NewAppointment, PageRequest, PatientId, SchedulingConfig, SchedulingError,
    };
    use mediflow_validation::ValidationErrorCode;

    fn booking(doctor: UserId, hour: u32, minute: u32, minutes: u32) -> NewAppointment {
        NewAppointment {
            patient_id: PatientId(101),
            doctor_id: doctor,
            start_time: at(hour, minute),
            duration_minutes: minutes,
            appointment_type: AppointmentType::FollowUp,
            reason: "Post-procedure check".to_string(),
            notes: Some("Bring discharge summary".to_string()),
        }
    }

    fn status(to: AppointmentStatus) -> AppointmentPatch {
        AppointmentPatch {
            status: Some(to),
            ..Default::default()
        }
    }

    #[test]
    fn test_book_into_free_gap() {
        let svc = clinic_service(SchedulingConfig::default());
        let desk = staff(Role::Receptionist);

        // Between the 09:00 consult and the 11:00 procedure, touching both
        let apt = svc.create(&desk, booking(DR_REYES, 9, 30, 90)).unwrap();
        assert_eq!(apt.status, AppointmentStatus::Scheduled);
        assert_eq!(apt.id, AppointmentId(5));
        assert_eq!(apt.end_time(), at(11, 0));

        let err = svc.create(&desk, booking(DR_REYES, 10, 45, 15)).unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_conflict_error_carries_the_blocking_booking() {
        let svc = clinic_service(SchedulingConfig::default());
        let err = svc
            .create(&staff(Role::Doctor), booking(DR_REYES, 12, 0, 60))
            .unwrap_err();

        match err {
            SchedulingError::Conflict {
                appointment_id,
                start,
                end,
            } => {
                assert_eq!(appointment_id, AppointmentId(2));
                assert_eq!(start, at(11, 0));
                assert_eq!(end, at(12, 30));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_non_doctor_staff_cannot_be_booked() {
        let svc = clinic_service(SchedulingConfig::default());
        for account in [NURSE_SILVA, RETIRED_ROLE_ACCOUNT, UserId(404)] {
            let err = svc
                .create(&staff(Role::Receptionist), booking(account, 15, 0, 30))
                .unwrap_err();
            assert_eq!(err.to_string(), format!("Doctor {} not found", account));
        }
    }

    #[test]
    fn test_reschedule_across_the_day() {
        let svc = clinic_service(SchedulingConfig::default());
        let doctor = staff(Role::Doctor);

        // Stretch the procedure over its own slot
        let moved = svc
            .update(
                &doctor,
                AppointmentId(2),
                AppointmentPatch {
                    start_time: Some(at(10, 30)),
                    duration_minutes: Some(120),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.end_time(), at(12, 30));
        assert_eq!(moved.notes.as_deref(), Some("Fasting not required"));

        // Onto the confirmed consult
        let err = svc
            .update(
                &doctor,
                AppointmentId(2),
                AppointmentPatch {
                    start_time: Some(at(9, 15)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::Conflict { appointment_id, .. } if appointment_id == AppointmentId(1)
        ));
    }

    #[test]
    fn test_rescheduling_a_cancelled_booking_skips_the_check() {
        let svc = clinic_service(SchedulingConfig::default());
        // Cancelled 14:00 follow-up moved over the 09:00 consult
        let moved = svc
            .update(
                &staff(Role::Receptionist),
                AppointmentId(3),
                AppointmentPatch {
                    start_time: Some(at(9, 0)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_visit_runs_through_statuses() {
        let svc = clinic_service(SchedulingConfig::default());
        let doctor = staff(Role::Doctor);
        let id = AppointmentId(4);

        for next in [
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(svc.update(&doctor, id, status(next)).unwrap().status, next);
        }

        let err = svc.update(&doctor, id, status(AppointmentStatus::Cancelled)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot change appointment status from completed to cancelled"
        );

        // A visit in progress or done no longer blocks the calendar
        svc.create(&doctor, booking(DR_OKAFOR, 9, 0, 30)).unwrap();
    }

    #[test]
    fn test_no_show_frees_the_slot() {
        let svc = clinic_service(SchedulingConfig::default());
        let desk = staff(Role::Receptionist);

        assert!(svc.create(&desk, booking(DR_OKAFOR, 9, 30, 30)).is_err());
        svc.update(&desk, AppointmentId(4), status(AppointmentStatus::NoShow)).unwrap();
        assert!(svc.create(&desk, booking(DR_OKAFOR, 9, 30, 30)).is_ok());
    }

    #[test]
    fn test_invalid_patches_rejected() {
        let svc = clinic_service(SchedulingConfig::default());
        let desk = staff(Role::Receptionist);

        let err = svc
            .update(&desk, AppointmentId(1), AppointmentPatch::default())
            .unwrap_err();
        assert!(matches!(
            &err,
            SchedulingError::Validation(e) if e.has_code(ValidationErrorCode::NothingToUpdate)
        ));

        let err = svc
            .update(
                &desk,
                AppointmentId(1),
                AppointmentPatch {
                    duration_minutes: Some(300),
                    reason: Some("x".repeat(501)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        match err {
            SchedulingError::Validation(errors) => {
                assert!(errors.has_field("duration_minutes"));
                assert!(errors.has_code(ValidationErrorCode::TooLong));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let err = svc
            .update(&desk, AppointmentId(99), status(AppointmentStatus::Confirmed))
            .unwrap_err();
        assert_eq!(err.to_string(), "Appointment 99 not found");
    }

    #[test]
    fn test_past_bookings_follow_config() {
        let yesterday = Utc.with_ymd_and_hms(2024, 2, 25, 9, 0, 0).unwrap();
        let mut request = booking(DR_LINDQVIST, 9, 0, 30);
        request.start_time = yesterday;

        let strict = clinic_service(SchedulingConfig::default());
        let err = strict.create(&staff(Role::Admin), request.clone()).unwrap_err();
        assert!(matches!(
            &err,
            SchedulingError::Validation(e) if e.has_code(ValidationErrorCode::InThePast)
        ));

        let lenient = clinic_service(SchedulingConfig {
            reject_past_appointments: false,
            ..Default::default()
        });
        assert!(lenient.create(&staff(Role::Admin), request).is_ok());
    }

    #[test]
    fn test_list_filters_and_pages() {
        let svc = clinic_service(SchedulingConfig::default());
        let nurse = staff(Role::Nurse);

        let all = svc
            .list(&nurse, &AppointmentFilter::default(), PageRequest::default())
            .unwrap();
        assert_eq!(all.total, 4);
        let ids: Vec<_> = all.items.iter().map(|a| a.id).collect();
        // Newest start first, ties by id descending
        let expected: Vec<_> = [3, 2, 4, 1].into_iter().map(AppointmentId).collect();
        assert_eq!(ids, expected);

        let reyes_active = AppointmentFilter {
            doctor_id: Some(DR_REYES),
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        };
        let page = svc.list(&nurse, &reyes_active, PageRequest::default()).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, AppointmentId(2));

        let morning = AppointmentFilter {
            date_from: Some(at(9, 0)),
            date_to: Some(at(11, 0)),
            ..Default::default()
        };
        let page = svc.list(&nurse, &morning, PageRequest::new(2, 2)).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);

        let by_patient = AppointmentFilter {
            patient_id: Some(PatientId(100)),
            ..Default::default()
        };
        assert_eq!(svc.list(&nurse, &by_patient, PageRequest::default()).unwrap().total, 2);
    }
}
