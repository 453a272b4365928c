use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use schedule_cell::services::AvailabilityService;
use schedule_cell::ScheduleError;
use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::scheduling::{Appointment, Interval, RefundTicket};
use shared_store::ClinicStore;

use crate::models::{
    AppointmentError, CompleteBookingRequest, InitiateBookingRequest, PaymentSessionResponse,
};
use crate::services::ledger::AppointmentLedger;
use crate::services::payment::{verify_payment_signature, PaymentProvider};

/// The write path from a selected slot to a persisted appointment.
///
/// Two-phase contract: `initiate_booking` runs an advisory availability
/// check and opens a payment session without holding the slot;
/// `complete_booking` verifies the provider confirmation and lets the
/// ledger's atomic insert decide the race. An abandoned checkout therefore
/// never blocks the slot for other patients.
pub struct BookingService {
    store: Arc<ClinicStore>,
    ledger: AppointmentLedger,
    availability: AvailabilityService,
    payments: Arc<dyn PaymentProvider>,
    key_id: String,
    key_secret: String,
}

impl BookingService {
    pub fn new(
        store: Arc<ClinicStore>,
        payments: Arc<dyn PaymentProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            ledger: AppointmentLedger::new(Arc::clone(&store)),
            availability: AvailabilityService::new(Arc::clone(&store)),
            store,
            payments,
            key_id: config.payment_key_id.clone(),
            key_secret: config.payment_key_secret.clone(),
        }
    }

    /// Validate the booking and open a payment session. No hold is placed on
    /// the slot; the availability check here is advisory only.
    pub async fn initiate_booking(
        &self,
        session: &Session,
        request: InitiateBookingRequest,
    ) -> Result<PaymentSessionResponse, AppointmentError> {
        info!(
            "Patient {} initiating booking with doctor {} on {} at {}",
            session.user_id, request.doctor_id, request.date, request.slot
        );

        self.validate_booking_fields(request.date, &request.slot, &request.reason)?;
        self.validate_doctor_fee(request.doctor_id, request.fee).await?;
        self.ensure_slot_open(request.doctor_id, request.date, &request.slot)
            .await?;

        let receipt = format!("apt-{}", Uuid::new_v4());
        // Gateway amounts are in minor currency units.
        let order = self.payments.create_order(request.fee * 100, &receipt).await?;

        Ok(PaymentSessionResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: self.key_id.clone(),
        })
    }

    /// Turn a confirmed payment into a persisted appointment. The ledger's
    /// insert is authoritative for conflicts; a post-payment loss is
    /// surfaced distinctly and queues a refund ticket for manual review.
    pub async fn complete_booking(
        &self,
        session: &Session,
        request: CompleteBookingRequest,
    ) -> Result<Appointment, AppointmentError> {
        self.validate_booking_fields(request.date, &request.slot, &request.reason)?;
        self.validate_doctor_fee(request.doctor_id, request.fee).await?;

        if !verify_payment_signature(
            &request.payment.order_id,
            &request.payment.payment_id,
            &request.payment.signature,
            &self.key_secret,
        ) {
            warn!(
                "Payment signature verification failed for order {}",
                request.payment.order_id
            );
            return Err(AppointmentError::Payment(
                "Payment signature verification failed".to_string(),
            ));
        }

        // The money has moved past this point; any rejection below owes the
        // patient a refund ticket.
        if !self.slot_is_offered(request.doctor_id, request.date, &request.slot).await? {
            self.queue_refund(session, &request, "slot no longer offered").await;
            return Err(AppointmentError::SlotUnavailable);
        }

        self.store
            .ensure_patient(session.user_id, session.email.clone())
            .await;

        match self
            .ledger
            .create(
                request.doctor_id,
                session.user_id,
                request.date,
                request.slot,
                request.reason.trim().to_string(),
                request.fee,
            )
            .await
        {
            Ok(appointment) => {
                info!(
                    "Booking completed: appointment {} for payment {}",
                    appointment.id, request.payment.payment_id
                );
                Ok(appointment)
            }
            Err(AppointmentError::Conflict) => {
                warn!(
                    "Slot taken after payment {} completed; queuing refund",
                    request.payment.payment_id
                );
                self.queue_refund(session, &request, "slot taken after payment").await;
                Err(AppointmentError::SlotTakenAfterPayment)
            }
            Err(e) => Err(e),
        }
    }

    fn validate_booking_fields(
        &self,
        date: NaiveDate,
        slot: &Interval,
        reason: &str,
    ) -> Result<(), AppointmentError> {
        if !slot.is_well_formed() {
            return Err(AppointmentError::Validation(
                "Slot start time must be before end time".to_string(),
            ));
        }
        if reason.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "A reason for the appointment is required".to_string(),
            ));
        }
        if date < Utc::now().date_naive() {
            return Err(AppointmentError::Validation(
                "Cannot book an appointment in the past".to_string(),
            ));
        }
        Ok(())
    }

    /// The client sends the fee it showed the patient; it must match the
    /// doctor's listed fee, not be trusted.
    async fn validate_doctor_fee(&self, doctor_id: Uuid, fee: i64) -> Result<(), AppointmentError> {
        let doctor = self
            .store
            .get_doctor(doctor_id)
            .await
            .ok_or(AppointmentError::DoctorNotFound)?;

        if fee != doctor.fee {
            return Err(AppointmentError::Validation(format!(
                "Fee does not match the doctor's listed fee of {}",
                doctor.fee
            )));
        }
        Ok(())
    }

    async fn ensure_slot_open(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &Interval,
    ) -> Result<(), AppointmentError> {
        let slots = self.derived_slots(doctor_id, date).await?;

        match slots.iter().find(|s| s.slot == *slot) {
            Some(derived) if !derived.booked => Ok(()),
            Some(_) => Err(AppointmentError::Conflict),
            None => Err(AppointmentError::SlotUnavailable),
        }
    }

    async fn slot_is_offered(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot: &Interval,
    ) -> Result<bool, AppointmentError> {
        let slots = self.derived_slots(doctor_id, date).await?;
        Ok(slots.iter().any(|s| s.slot == *slot))
    }

    async fn derived_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<schedule_cell::DerivedSlot>, AppointmentError> {
        self.availability
            .get_availability(doctor_id, date)
            .await
            .map_err(|e| match e {
                ScheduleError::DoctorNotFound => AppointmentError::DoctorNotFound,
                ScheduleError::DateInPast => AppointmentError::Validation(e.to_string()),
                other => AppointmentError::Validation(other.to_string()),
            })
    }

    async fn queue_refund(
        &self,
        session: &Session,
        request: &CompleteBookingRequest,
        reason: &str,
    ) {
        self.store
            .push_refund(RefundTicket {
                id: Uuid::new_v4(),
                order_id: request.payment.order_id.clone(),
                payment_id: request.payment.payment_id.clone(),
                patient_id: session.user_id,
                doctor_id: request.doctor_id,
                amount: request.fee,
                reason: reason.to_string(),
                created_at: Utc::now(),
            })
            .await;
    }
}
