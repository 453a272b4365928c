use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::BookingState;

pub fn appointment_routes(state: BookingState) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        .route("/book/initiate", post(handlers::initiate_booking))
        .route("/book/complete", post(handlers::complete_booking))
        .route("/mine", get(handlers::list_my_appointments))
        .route("/doctor", get(handlers::list_doctor_appointments))
        .route("/{appointment_id}/status", patch(handlers::update_status))
        .route("/refunds", get(handlers::list_refund_tickets))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
