use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_models::scheduling::Weekday;

use crate::models::{AvailabilityQuery, ScheduleError, SetTemplateRequest};
use crate::services::{AvailabilityService, SlotTemplateService};
use crate::ScheduleState;

fn require_doctor(session: &Session) -> Result<(), AppError> {
    if !session.is_doctor() {
        return Err(AppError::Forbidden(
            "Only doctors can manage schedules".to_string(),
        ));
    }
    Ok(())
}

/// Weekly template for one weekday of the authenticated doctor.
#[axum::debug_handler]
pub async fn get_day_slots(
    State(state): State<ScheduleState>,
    Path(day): Path<Weekday>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    require_doctor(&session)?;

    let service = SlotTemplateService::new(Arc::clone(&state.store));
    let slots = service.get_template(session.user_id, day).await;

    Ok(Json(json!({
        "day": day,
        "slots": slots
    })))
}

/// Replace the authenticated doctor's slots for one weekday.
#[axum::debug_handler]
pub async fn set_day_slots(
    State(state): State<ScheduleState>,
    Extension(session): Extension<Session>,
    Json(request): Json<SetTemplateRequest>,
) -> Result<Json<Value>, AppError> {
    require_doctor(&session)?;

    let service = SlotTemplateService::new(Arc::clone(&state.store));
    service
        .set_template(session.user_id, request.day, request.slots)
        .await
        .map_err(|e| match e {
            ScheduleError::InvalidInterval(_) | ScheduleError::OverlappingSlots(_, _) => {
                AppError::ValidationError(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Schedule updated successfully"
    })))
}

/// Delete every slot for one weekday of the authenticated doctor.
#[axum::debug_handler]
pub async fn clear_day_slots(
    State(state): State<ScheduleState>,
    Path(day): Path<Weekday>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    require_doctor(&session)?;

    let service = SlotTemplateService::new(Arc::clone(&state.store));
    service.clear_template(session.user_id, day).await;

    Ok(Json(json!({
        "success": true,
        "message": format!("All slots deleted for {}", day)
    })))
}

/// Date-specific availability for a doctor, visible to any signed-in user.
#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<ScheduleState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
    Extension(_session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(Arc::clone(&state.store));

    let slots = service
        .get_availability(doctor_id, query.date)
        .await
        .map_err(|e| match e {
            ScheduleError::DateInPast => AppError::ValidationError(e.to_string()),
            ScheduleError::DoctorNotFound => AppError::NotFound(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "date": query.date,
        "slots": slots
    })))
}
