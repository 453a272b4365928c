use tracing::{debug, warn};

use shared_models::scheduling::{Appointment, AppointmentStatus};

use crate::models::{Actor, AppointmentError};

/// Appointment status state machine, centralized so every call site shares
/// one transition-legality table instead of re-deciding it inline.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    /// All valid next statuses for a given current status.
    pub fn valid_transitions(status: AppointmentStatus) -> &'static [AppointmentStatus] {
        match status {
            AppointmentStatus::Booked => {
                &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Cancelled, AppointmentStatus::Completed]
            }
            // Terminal states - no transitions allowed
            AppointmentStatus::Cancelled | AppointmentStatus::Completed => &[],
        }
    }

    pub fn validate_transition(
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if !Self::valid_transitions(from).contains(&to) {
            warn!("Invalid status transition attempted: {} -> {}", from, to);
            return Err(AppointmentError::InvalidTransition { from, to });
        }

        debug!("Status transition validated: {} -> {}", from, to);
        Ok(())
    }

    /// The actor must be a party to the appointment: its assigned doctor or
    /// its owning patient. System actors pass for background processing.
    pub fn authorize_party(
        actor: &Actor,
        appointment: &Appointment,
    ) -> Result<(), AppointmentError> {
        match actor {
            Actor::Doctor(id) if *id == appointment.doctor_id => Ok(()),
            Actor::Patient(id) if *id == appointment.patient_id => Ok(()),
            Actor::System => Ok(()),
            _ => {
                warn!("Actor {:?} is not a party to appointment {}", actor, appointment.id);
                Err(AppointmentError::Unauthorized)
            }
        }
    }

    /// Role rules per target status: only the assigned doctor accepts a
    /// booking, either party may cancel, and completion is reserved for
    /// background processing.
    pub fn authorize_target(actor: &Actor, to: AppointmentStatus) -> Result<(), AppointmentError> {
        let allowed = match to {
            AppointmentStatus::Confirmed => matches!(actor, Actor::Doctor(_)),
            AppointmentStatus::Cancelled => {
                matches!(actor, Actor::Doctor(_) | Actor::Patient(_) | Actor::System)
            }
            AppointmentStatus::Completed => matches!(actor, Actor::System),
            AppointmentStatus::Booked => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(AppointmentError::Unauthorized)
        }
    }
}
