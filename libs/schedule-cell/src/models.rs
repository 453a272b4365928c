use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::scheduling::{Interval, Weekday};

/// One bookable entry for a concrete date: a template interval plus whether
/// an active appointment currently holds it. Computed per request, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedSlot {
    #[serde(flatten)]
    pub slot: Interval,
    pub booked: bool,
}

/// Wholesale replacement of one weekday's template.
#[derive(Debug, Clone, Deserialize)]
pub struct SetTemplateRequest {
    pub day: Weekday,
    pub slots: Vec<Interval>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("Start time must be before end time: {0}")]
    InvalidInterval(Interval),

    #[error("Slots overlap: {0} and {1}")]
    OverlappingSlots(Interval, Interval),

    #[error("Cannot fetch availability for a past date")]
    DateInPast,

    #[error("Doctor not found")]
    DoctorNotFound,
}
