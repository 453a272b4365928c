use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::ScheduleState;

pub fn schedule_routes(state: ScheduleState) -> Router {
    // All schedule operations require authentication
    let protected_routes = Router::new()
        .route(
            "/slots/{day}",
            get(handlers::get_day_slots).delete(handlers::clear_day_slots),
        )
        .route("/slots", put(handlers::set_day_slots))
        .route(
            "/doctors/{doctor_id}/availability",
            get(handlers::get_doctor_availability),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
