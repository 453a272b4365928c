use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use appointment_cell::models::{Actor, AppointmentError};
use appointment_cell::services::ledger::AppointmentLedger;
use schedule_cell::services::{AvailabilityService, SlotTemplateService};
use shared_models::scheduling::{
    AppointmentStatus, DoctorProfile, Interval, PatientProfile, Weekday,
};
use shared_store::ClinicStore;

fn interval(start: &str, end: &str) -> Interval {
    Interval::new(
        NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
        NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
    )
}

// A Monday far enough out that the past-date guard never trips.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

async fn seed_doctor(store: &ClinicStore, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .upsert_doctor(DoctorProfile {
            id,
            name: name.to_string(),
            email: Some("doctor@clinic.example".to_string()),
            specialty: Some("General Medicine".to_string()),
            fee: 500,
        })
        .await;
    id
}

#[tokio::test]
async fn create_rejects_a_second_active_booking_for_the_same_slot() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();

    ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let second = ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Cold".to_string(),
            500,
        )
        .await;

    assert_matches!(second, Err(AppointmentError::Conflict));
}

#[tokio::test]
async fn cancellation_frees_the_slot_for_rebooking() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    ledger
        .update_status(
            appointment.id,
            Actor::Patient(patient_id),
            AppointmentStatus::Cancelled,
        )
        .await
        .unwrap();

    let rebooked = ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Cold".to_string(),
            500,
        )
        .await;

    assert!(rebooked.is_ok());
}

#[tokio::test]
async fn cancellation_is_visible_in_materialized_availability() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = seed_doctor(&store, "Dr. Asha Rao").await;
    let patient_id = Uuid::new_v4();
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let templates = SlotTemplateService::new(Arc::clone(&store));
    let availability = AvailabilityService::new(Arc::clone(&store));

    templates
        .set_template(doctor_id, Weekday::Monday, vec![interval("09:00", "09:30")])
        .await
        .unwrap();

    let appointment = ledger
        .create(
            doctor_id,
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let slots = availability.get_availability(doctor_id, monday()).await.unwrap();
    assert!(slots[0].booked);

    ledger
        .update_status(
            appointment.id,
            Actor::Patient(patient_id),
            AppointmentStatus::Cancelled,
        )
        .await
        .unwrap();

    let slots = availability.get_availability(doctor_id, monday()).await.unwrap();
    assert!(!slots[0].booked);
}

#[tokio::test]
async fn assigned_doctor_confirms_a_booking() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let confirmed = ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Confirmed,
        )
        .await
        .unwrap();

    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn a_different_doctor_cannot_confirm_the_booking() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));

    let appointment = ledger
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let result = ledger
        .update_status(
            appointment.id,
            Actor::Doctor(Uuid::new_v4()),
            AppointmentStatus::Confirmed,
        )
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn the_owning_patient_cannot_confirm_their_own_booking() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let patient_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            Uuid::new_v4(),
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let result = ledger
        .update_status(
            appointment.id,
            Actor::Patient(patient_id),
            AppointmentStatus::Confirmed,
        )
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn another_patient_cannot_cancel_someone_elses_booking() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));

    let appointment = ledger
        .create(
            Uuid::new_v4(),
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let result = ledger
        .update_status(
            appointment.id,
            Actor::Patient(Uuid::new_v4()),
            AppointmentStatus::Cancelled,
        )
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn either_party_can_cancel_after_confirmation() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Confirmed,
        )
        .await
        .unwrap();

    let cancelled = ledger
        .update_status(
            appointment.id,
            Actor::Patient(patient_id),
            AppointmentStatus::Cancelled,
        )
        .await
        .unwrap();

    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn cancelled_is_terminal() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    ledger
        .update_status(
            appointment.id,
            Actor::Patient(patient_id),
            AppointmentStatus::Cancelled,
        )
        .await
        .unwrap();

    for target in [
        AppointmentStatus::Booked,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
    ] {
        let result = ledger
            .update_status(appointment.id, Actor::Doctor(doctor_id), target)
            .await;
        assert_matches!(
            result,
            Err(AppointmentError::InvalidTransition { .. }),
            "cancelled -> {} should be rejected",
            target
        );
    }
}

#[tokio::test]
async fn completed_is_terminal() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Confirmed,
        )
        .await
        .unwrap();

    // Completion is reserved for background processing
    ledger
        .update_status(appointment.id, Actor::System, AppointmentStatus::Completed)
        .await
        .unwrap();

    let result = ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Cancelled,
        )
        .await;
    assert_matches!(result, Err(AppointmentError::InvalidTransition { .. }));
}

#[tokio::test]
async fn doctors_cannot_mark_appointments_completed() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));
    let doctor_id = Uuid::new_v4();

    let appointment = ledger
        .create(
            doctor_id,
            Uuid::new_v4(),
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Confirmed,
        )
        .await
        .unwrap();

    let result = ledger
        .update_status(
            appointment.id,
            Actor::Doctor(doctor_id),
            AppointmentStatus::Completed,
        )
        .await;
    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn update_status_for_unknown_appointment_is_not_found() {
    let store = Arc::new(ClinicStore::new());
    let ledger = AppointmentLedger::new(Arc::clone(&store));

    let result = ledger
        .update_status(Uuid::new_v4(), Actor::System, AppointmentStatus::Cancelled)
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn listings_join_the_counterparty_summaries() {
    let store = Arc::new(ClinicStore::new());
    let doctor_id = seed_doctor(&store, "Dr. Asha Rao").await;
    let patient_id = Uuid::new_v4();
    let ledger = AppointmentLedger::new(Arc::clone(&store));

    store
        .upsert_patient(PatientProfile {
            id: patient_id,
            name: Some("Rahul Nair".to_string()),
            email: Some("rahul@example.com".to_string()),
        })
        .await;

    ledger
        .create(
            doctor_id,
            patient_id,
            monday(),
            interval("09:00", "09:30"),
            "Fever".to_string(),
            500,
        )
        .await
        .unwrap();

    let for_doctor = ledger.list_for_doctor(doctor_id).await;
    assert_eq!(for_doctor.len(), 1);
    assert_eq!(
        for_doctor[0].patient.as_ref().unwrap().name.as_deref(),
        Some("Rahul Nair")
    );

    let for_patient = ledger.list_for_patient(patient_id).await;
    assert_eq!(for_patient.len(), 1);
    assert_eq!(for_patient[0].doctor.as_ref().unwrap().name, "Dr. Asha Rao");
}
