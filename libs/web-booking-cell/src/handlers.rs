use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use deadpool_redis::Pool;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::AppError;

use crate::error::WebBookingError;
use crate::models::{BookingStatusResponse, PendingWebBooking, ReserveRequest, ReserveResponse, WebBookingRequest};
use crate::services::{PendingBookingService, ReservationService};

#[derive(Clone)]
pub struct WebBookingState {
    pub redis: Pool,
    pub config: Arc<AppConfig>,
}

/// POST /web/reserve — place a short-lived hold on a slot while the
/// visitor enters contact details. 409 when the slot is already held.
#[axum::debug_handler]
pub async fn create_reservation(
    State(state): State<WebBookingState>,
    Json(request): Json<ReserveRequest>,
) -> Result<Json<ReserveResponse>, AppError> {
    let service =
        ReservationService::new(state.redis.clone(), state.config.reservation_ttl_seconds);
    let reservation = service.reserve(request, Utc::now()).await?;

    Ok(Json(ReserveResponse {
        id: reservation.id,
        expires_in: service.ttl_seconds(),
    }))
}

/// DELETE /web/reserve/{id} — release a hold early.
#[axum::debug_handler]
pub async fn release_reservation(
    State(state): State<WebBookingState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service =
        ReservationService::new(state.redis.clone(), state.config.reservation_ttl_seconds);
    service.release(id).await?;

    Ok(Json(json!({ "status": "cancelled" })))
}

/// POST /web/bookings — turn a live reservation plus contact info into a
/// pending booking for the trusted processor.
#[axum::debug_handler]
pub async fn create_pending_booking(
    State(state): State<WebBookingState>,
    Json(request): Json<WebBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    let reservations =
        ReservationService::new(state.redis.clone(), state.config.reservation_ttl_seconds);
    let reservation = reservations
        .get(request.reservation_id)
        .await?
        .ok_or(WebBookingError::ReservationNotFound(request.reservation_id))?;

    let booking = PendingWebBooking::new(&reservation, &request, Utc::now());
    let pending = PendingBookingService::new(
        state.redis.clone(),
        state.config.pending_booking_ttl_seconds,
    );
    pending.create(&booking).await?;

    Ok(Json(BookingStatusResponse::from(&booking)))
}

/// GET /web/bookings/{id} — poll until the status is terminal.
#[axum::debug_handler]
pub async fn get_booking_status(
    State(state): State<WebBookingState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    let pending = PendingBookingService::new(
        state.redis.clone(),
        state.config.pending_booking_ttl_seconds,
    );
    let booking = pending
        .get(id)
        .await?
        .ok_or(WebBookingError::BookingNotFound(id))?;

    Ok(Json(BookingStatusResponse::from(&booking)))
}
