use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::{Role, Session};
use shared_models::scheduling::{
    Appointment, AppointmentStatus, DoctorProfile, Interval, PatientProfile,
};

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateBookingRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub slot: Interval,
    pub reason: String,
    pub fee: i64,
}

/// Provider-verified confirmation forwarded by the checkout widget after a
/// successful payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteBookingRequest {
    pub payment: PaymentConfirmation,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub slot: Interval,
    pub reason: String,
    pub fee: i64,
}

/// Handle the client needs to open the checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSessionResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithPatient {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient: Option<PatientProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithDoctor {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorProfile>,
}

// ==============================================================================
// ACTORS
// ==============================================================================

/// Who is asking for a status change. Derived from the request session;
/// `System` is reserved for background processing and never comes off the
/// HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Patient(Uuid),
    Doctor(Uuid),
    System,
}

impl Actor {
    pub fn from_session(session: &Session) -> Option<Self> {
        match session.role {
            Role::Patient => Some(Actor::Patient(session.user_id)),
            Role::Doctor => Some(Actor::Doctor(session.user_id)),
            Role::Admin => None,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("This slot was just taken, please pick another")]
    Conflict,

    #[error("The slot was taken after payment completed; a refund has been queued for review")]
    SlotTakenAfterPayment,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Not authorized to modify this appointment")]
    Unauthorized,

    #[error("This slot is not offered by the doctor's schedule")]
    SlotUnavailable,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
