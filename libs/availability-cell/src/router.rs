use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, AvailabilityState};

pub fn create_availability_router(state: AvailabilityState) -> Router {
    Router::new()
        .route("/calendar", get(handlers::get_slots_calendar))
        .route("/day", get(handlers::get_service_day))
        .route("/grid", get(handlers::get_slots_grid))
        .route("/invalidate", post(handlers::invalidate_slots))
        .with_state(state)
}
