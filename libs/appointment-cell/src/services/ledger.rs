use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::scheduling::{Appointment, AppointmentStatus, Interval};
use shared_store::{ClinicStore, StoreError};

use crate::models::{Actor, AppointmentError, AppointmentWithDoctor, AppointmentWithPatient};
use crate::services::lifecycle::AppointmentLifecycle;

/// Owns appointment records: creation under the no-double-booking invariant
/// and status changes through the lifecycle state machine. Records are never
/// deleted; cancellations keep the row for reporting.
pub struct AppointmentLedger {
    store: Arc<ClinicStore>,
}

impl AppointmentLedger {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Create a booking. The store re-checks the uniqueness invariant and
    /// inserts in a single atomic step; losing a race for the slot surfaces
    /// as `Conflict`. Never retried automatically.
    pub async fn create(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        slot: Interval,
        reason: String,
        fee: i64,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            date,
            slot,
            reason,
            fee,
            status: AppointmentStatus::Booked,
            created_at: Utc::now(),
        };

        let appointment = self
            .store
            .insert_appointment(appointment)
            .await
            .map_err(|e| match e {
                StoreError::SlotTaken => AppointmentError::Conflict,
                other => AppointmentError::Storage(other.to_string()),
            })?;

        info!(
            "Appointment {} booked for doctor {} on {} at {}",
            appointment.id, doctor_id, date, appointment.slot
        );
        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .appointment(appointment_id)
            .await
            .ok_or(AppointmentError::NotFound)
    }

    /// Apply a status change on behalf of an actor: party scope first, then
    /// transition legality, then the per-target role rule.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        actor: Actor,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get(appointment_id).await?;

        AppointmentLifecycle::authorize_party(&actor, &appointment)?;
        AppointmentLifecycle::validate_transition(appointment.status, new_status)?;
        AppointmentLifecycle::authorize_target(&actor, new_status)?;

        appointment.status = new_status;
        let appointment = self
            .store
            .save_appointment(appointment)
            .await
            .map_err(|e| AppointmentError::Storage(e.to_string()))?;

        info!(
            "Appointment {} moved to {} by {:?}",
            appointment.id, new_status, actor
        );
        Ok(appointment)
    }

    /// Schedule view for a doctor, joined with the patient summary.
    pub async fn list_for_doctor(&self, doctor_id: Uuid) -> Vec<AppointmentWithPatient> {
        let appointments = self.store.appointments_for_doctor(doctor_id).await;
        debug!(
            "Listing {} appointment(s) for doctor {}",
            appointments.len(),
            doctor_id
        );

        let mut result = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let patient = self.store.get_patient(appointment.patient_id).await;
            result.push(AppointmentWithPatient {
                appointment,
                patient,
            });
        }
        result
    }

    /// Booking history for a patient, joined with the doctor summary.
    pub async fn list_for_patient(&self, patient_id: Uuid) -> Vec<AppointmentWithDoctor> {
        let appointments = self.store.appointments_for_patient(patient_id).await;
        debug!(
            "Listing {} appointment(s) for patient {}",
            appointments.len(),
            patient_id
        );

        let mut result = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let doctor = self.store.get_doctor(appointment.doctor_id).await;
            result.push(AppointmentWithDoctor {
                appointment,
                doctor,
            });
        }
        result
    }
}
