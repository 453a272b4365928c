use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Session;
use shared_models::error::AppError;

use crate::models::{
    Actor, AppointmentError, CompleteBookingRequest, InitiateBookingRequest, UpdateStatusRequest,
};
use crate::services::booking::BookingService;
use crate::services::ledger::AppointmentLedger;
use crate::BookingState;

fn require_patient(session: &Session) -> Result<(), AppError> {
    if !session.is_patient() {
        return Err(AppError::Forbidden(
            "Only patients can book appointments".to_string(),
        ));
    }
    Ok(())
}

fn to_app_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound | AppointmentError::DoctorNotFound => {
            AppError::NotFound(e.to_string())
        }
        AppointmentError::Conflict | AppointmentError::SlotTakenAfterPayment => {
            AppError::Conflict(e.to_string())
        }
        AppointmentError::SlotUnavailable | AppointmentError::InvalidTransition { .. } => {
            AppError::BadRequest(e.to_string())
        }
        AppointmentError::Unauthorized => AppError::Forbidden(e.to_string()),
        AppointmentError::Validation(msg) => AppError::ValidationError(msg),
        AppointmentError::Payment(msg) => AppError::ExternalService(msg),
        AppointmentError::Storage(msg) => AppError::Internal(msg),
    }
}

/// Phase one of booking: advisory slot check, then a payment session the
/// client can open the checkout widget with.
#[axum::debug_handler]
pub async fn initiate_booking(
    State(state): State<BookingState>,
    Extension(session): Extension<Session>,
    Json(request): Json<InitiateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    require_patient(&session)?;

    let service = BookingService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.payments),
        &state.config,
    );

    let payment_session = service
        .initiate_booking(&session, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "payment_session": payment_session
    })))
}

/// Phase two of booking: runs after the checkout widget reports success.
#[axum::debug_handler]
pub async fn complete_booking(
    State(state): State<BookingState>,
    Extension(session): Extension<Session>,
    Json(request): Json<CompleteBookingRequest>,
) -> Result<Json<Value>, AppError> {
    require_patient(&session)?;

    let service = BookingService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.payments),
        &state.config,
    );

    let appointment = service
        .complete_booking(&session, request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment booked successfully"
    })))
}

/// A patient's own bookings, joined with doctor summaries.
#[axum::debug_handler]
pub async fn list_my_appointments(
    State(state): State<BookingState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    require_patient(&session)?;

    let ledger = AppointmentLedger::new(Arc::clone(&state.store));
    let appointments = ledger.list_for_patient(session.user_id).await;

    Ok(Json(json!({ "appointments": appointments })))
}

/// A doctor's schedule, joined with patient summaries.
#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(state): State<BookingState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    if !session.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can view their appointment schedule".to_string(),
        ));
    }

    let ledger = AppointmentLedger::new(Arc::clone(&state.store));
    let appointments = ledger.list_for_doctor(session.user_id).await;

    Ok(Json(json!({ "appointments": appointments })))
}

/// Status transition: doctors accept or cancel, patients cancel their own.
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<BookingState>,
    Path(appointment_id): Path<Uuid>,
    Extension(session): Extension<Session>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::from_session(&session).ok_or_else(|| {
        AppError::Forbidden("Administrators cannot change appointment status".to_string())
    })?;

    let ledger = AppointmentLedger::new(Arc::clone(&state.store));
    let appointment = ledger
        .update_status(appointment_id, actor, request.status)
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

/// Refund tickets awaiting manual review.
#[axum::debug_handler]
pub async fn list_refund_tickets(
    State(state): State<BookingState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    if !session.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators can review refunds".to_string(),
        ));
    }

    let refunds = state.store.refunds().await;
    Ok(Json(json!({ "refunds": refunds })))
}
