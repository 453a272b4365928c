use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::scheduling::{
    Appointment, DoctorProfile, Interval, PatientProfile, RefundTicket, Weekday,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("An active appointment already holds this slot")]
    SlotTaken,

    #[error("Record not found")]
    NotFound,
}

/// Clinic data store. Each table sits behind its own `RwLock`; reads take
/// shared locks and may be a round trip stale, writes re-validate. The
/// appointment table's `insert_appointment` is the single serialization
/// point for the no-double-booking invariant.
#[derive(Default)]
pub struct ClinicStore {
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
    patients: RwLock<HashMap<Uuid, PatientProfile>>,
    templates: RwLock<HashMap<(Uuid, Weekday), Vec<Interval>>>,
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    refunds: RwLock<Vec<RefundTicket>>,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Doctor / patient directory (summaries only; identity lives elsewhere)
    // ------------------------------------------------------------------

    pub async fn upsert_doctor(&self, doctor: DoctorProfile) {
        self.doctors.write().await.insert(doctor.id, doctor);
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Option<DoctorProfile> {
        self.doctors.read().await.get(&doctor_id).cloned()
    }

    /// Record a patient summary if none exists yet, so appointment listings
    /// can join contact details without consulting the identity provider.
    pub async fn ensure_patient(&self, patient_id: Uuid, email: Option<String>) {
        let mut patients = self.patients.write().await;
        patients.entry(patient_id).or_insert(PatientProfile {
            id: patient_id,
            name: None,
            email,
        });
    }

    pub async fn upsert_patient(&self, patient: PatientProfile) {
        self.patients.write().await.insert(patient.id, patient);
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Option<PatientProfile> {
        self.patients.read().await.get(&patient_id).cloned()
    }

    // ------------------------------------------------------------------
    // Weekly templates
    // ------------------------------------------------------------------

    /// Intervals in the order the doctor saved them; empty if none set.
    pub async fn template_for(&self, doctor_id: Uuid, day: Weekday) -> Vec<Interval> {
        self.templates
            .read()
            .await
            .get(&(doctor_id, day))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn replace_template(&self, doctor_id: Uuid, day: Weekday, slots: Vec<Interval>) {
        debug!("Replacing {} template for doctor {}", day, doctor_id);
        self.templates
            .write()
            .await
            .insert((doctor_id, day), slots);
    }

    pub async fn clear_template(&self, doctor_id: Uuid, day: Weekday) {
        debug!("Clearing {} template for doctor {}", day, doctor_id);
        self.templates.write().await.remove(&(doctor_id, day));
    }

    // ------------------------------------------------------------------
    // Appointments
    // ------------------------------------------------------------------

    /// Check-then-insert under the table write lock: while the lock is held
    /// no other task can observe or create an appointment, so the uniqueness
    /// scan and the insert form one atomic unit.
    pub async fn insert_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;

        let taken = appointments.values().any(|existing| {
            existing.doctor_id == appointment.doctor_id
                && existing.date == appointment.date
                && existing.slot == appointment.slot
                && existing.holds_slot()
        });

        if taken {
            warn!(
                "Slot {} on {} already held for doctor {}",
                appointment.slot, appointment.date, appointment.doctor_id
            );
            return Err(StoreError::SlotTaken);
        }

        appointments.insert(appointment.id, appointment.clone());
        debug!("Appointment {} inserted", appointment.id);
        Ok(appointment)
    }

    pub async fn appointment(&self, appointment_id: Uuid) -> Option<Appointment> {
        self.appointments
            .read()
            .await
            .get(&appointment_id)
            .cloned()
    }

    pub async fn save_appointment(
        &self,
        appointment: Appointment,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        if !appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    /// Appointments still holding a slot for the given doctor and date.
    pub async fn active_appointments_for_day(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Vec<Appointment> {
        let mut result: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date && a.holds_slot())
            .cloned()
            .collect();
        result.sort_by(|a, b| (a.date, a.slot.start).cmp(&(b.date, b.slot.start)));
        result
    }

    pub async fn appointments_for_doctor(&self, doctor_id: Uuid) -> Vec<Appointment> {
        let mut result: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| (a.date, a.slot.start).cmp(&(b.date, b.slot.start)));
        result
    }

    pub async fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let mut result: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| (a.date, a.slot.start).cmp(&(b.date, b.slot.start)));
        result
    }

    // ------------------------------------------------------------------
    // Refund queue
    // ------------------------------------------------------------------

    pub async fn push_refund(&self, ticket: RefundTicket) {
        warn!(
            "Refund ticket {} queued for payment {} (amount {})",
            ticket.id, ticket.payment_id, ticket.amount
        );
        self.refunds.write().await.push(ticket);
    }

    pub async fn refunds(&self) -> Vec<RefundTicket> {
        self.refunds.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveTime, Utc};
    use shared_models::scheduling::AppointmentStatus;

    fn appointment(doctor_id: Uuid, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            slot: Interval::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ),
            reason: "Checkup".to_string(),
            fee: 500,
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_a_second_active_holder() {
        let store = ClinicStore::new();
        let doctor_id = Uuid::new_v4();

        store
            .insert_appointment(appointment(doctor_id, AppointmentStatus::Booked))
            .await
            .unwrap();

        let result = store
            .insert_appointment(appointment(doctor_id, AppointmentStatus::Booked))
            .await;
        assert_matches!(result, Err(StoreError::SlotTaken));
    }

    #[tokio::test]
    async fn insert_ignores_released_slots() {
        let store = ClinicStore::new();
        let doctor_id = Uuid::new_v4();

        store
            .insert_appointment(appointment(doctor_id, AppointmentStatus::Cancelled))
            .await
            .unwrap();

        let result = store
            .insert_appointment(appointment(doctor_id, AppointmentStatus::Booked))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn save_requires_an_existing_record() {
        let store = ClinicStore::new();

        let result = store
            .save_appointment(appointment(Uuid::new_v4(), AppointmentStatus::Booked))
            .await;
        assert_matches!(result, Err(StoreError::NotFound));
    }
}
