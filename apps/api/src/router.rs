use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::BookingState;
use schedule_cell::router::schedule_routes;
use schedule_cell::ScheduleState;

pub fn create_router(schedule_state: ScheduleState, booking_state: BookingState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/schedule", schedule_routes(schedule_state))
        .nest("/appointments", appointment_routes(booking_state))
}
