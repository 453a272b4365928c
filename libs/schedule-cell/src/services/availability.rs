use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_models::scheduling::Weekday;
use shared_store::ClinicStore;

use crate::models::{DerivedSlot, ScheduleError};

/// Materializes date-specific bookable slots from a doctor's weekly
/// template, overlaying active appointments. Output is derived fresh per
/// request, so every successful booking shows up on the next call.
pub struct AvailabilityService {
    store: Arc<ClinicStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Slots for the given doctor and date, each flagged booked when an
    /// active appointment holds exactly that interval. A weekday with no
    /// template yields an empty list: the doctor is unavailable that day.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<DerivedSlot>, ScheduleError> {
        if date < Utc::now().date_naive() {
            return Err(ScheduleError::DateInPast);
        }

        if self.store.get_doctor(doctor_id).await.is_none() {
            return Err(ScheduleError::DoctorNotFound);
        }

        let day = Weekday::of(date);
        let template = self.store.template_for(doctor_id, day).await;
        if template.is_empty() {
            debug!("Doctor {} has no template for {}", doctor_id, day);
            return Ok(vec![]);
        }

        let appointments = self.store.active_appointments_for_day(doctor_id, date).await;

        let slots: Vec<DerivedSlot> = template
            .into_iter()
            .map(|slot| DerivedSlot {
                booked: appointments.iter().any(|a| a.slot == slot),
                slot,
            })
            .collect();

        debug!(
            "Materialized {} slot(s) for doctor {} on {}",
            slots.len(),
            doctor_id,
            date
        );
        Ok(slots)
    }
}
