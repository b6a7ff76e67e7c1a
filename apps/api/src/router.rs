use axum::{routing::get, Router};

use availability_cell::{create_availability_router, AvailabilityState};
use web_booking_cell::{create_web_booking_router, WebBookingState};

pub fn create_router(availability: AvailabilityState, web: WebBookingState) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking platform API is running!" }))
        .nest("/slots", create_availability_router(availability))
        .nest("/web", create_web_booking_router(web))
}
