use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, WebBookingState};

pub fn create_web_booking_router(state: WebBookingState) -> Router {
    Router::new()
        .route("/reserve", post(handlers::create_reservation))
        .route(
            "/reserve/{id}",
            axum::routing::delete(handlers::release_reservation),
        )
        .route("/bookings", post(handlers::create_pending_booking))
        .route("/bookings/{id}", get(handlers::get_booking_status))
        .with_state(state)
}
