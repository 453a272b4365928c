use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_models::scheduling::{Interval, Weekday};
use shared_store::ClinicStore;

use crate::models::ScheduleError;

/// Owns a doctor's recurring weekly availability, one interval list per
/// weekday. Saves replace the day wholesale, the way the schedule editor
/// submits them.
pub struct SlotTemplateService {
    store: Arc<ClinicStore>,
}

impl SlotTemplateService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Intervals for the given weekday, in the order the doctor saved them.
    /// Empty if the doctor has not set that day up.
    pub async fn get_template(&self, doctor_id: Uuid, day: Weekday) -> Vec<Interval> {
        self.store.template_for(doctor_id, day).await
    }

    /// Replace the full interval set for one weekday. Rejects inverted
    /// intervals and any pair that overlaps; a shared boundary (one slot
    /// ending exactly when the next starts) is allowed.
    pub async fn set_template(
        &self,
        doctor_id: Uuid,
        day: Weekday,
        slots: Vec<Interval>,
    ) -> Result<(), ScheduleError> {
        for slot in &slots {
            if !slot.is_well_formed() {
                return Err(ScheduleError::InvalidInterval(*slot));
            }
        }

        for (i, a) in slots.iter().enumerate() {
            for b in slots.iter().skip(i + 1) {
                if a.overlaps(b) {
                    return Err(ScheduleError::OverlappingSlots(*a, *b));
                }
            }
        }

        debug!(
            "Saving {} slot(s) for doctor {} on {}",
            slots.len(),
            doctor_id,
            day
        );
        self.store.replace_template(doctor_id, day, slots).await;
        Ok(())
    }

    /// Remove every interval for the given weekday.
    pub async fn clear_template(&self, doctor_id: Uuid, day: Weekday) {
        self.store.clear_template(doctor_id, day).await;
    }
}
