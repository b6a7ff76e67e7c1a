use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum WebBookingError {
    #[error("Slot {0} is already reserved")]
    SlotAlreadyReserved(String),

    #[error("Reservation {0} not found or expired")]
    ReservationNotFound(Uuid),

    #[error("Pending booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cache error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache pool error: {0}")]
    CachePool(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Booking rejected: {0}")]
    Downstream(String),

    #[error("Booking transport error: {0}")]
    Transport(String),
}

impl From<WebBookingError> for AppError {
    fn from(err: WebBookingError) -> Self {
        match err {
            WebBookingError::SlotAlreadyReserved(slot) => {
                AppError::Conflict(format!("Slot {} is already reserved", slot))
            }
            WebBookingError::ReservationNotFound(id) => {
                AppError::NotFound(format!("Reservation {} not found or expired", id))
            }
            WebBookingError::BookingNotFound(id) => {
                AppError::NotFound(format!("Pending booking {} not found", id))
            }
            WebBookingError::Validation(msg) => AppError::ValidationError(msg),
            WebBookingError::Downstream(msg) => AppError::ExternalService(msg),
            WebBookingError::Transport(msg) => AppError::ExternalService(msg),
            WebBookingError::Redis(e) => AppError::Internal(e.to_string()),
            WebBookingError::CachePool(msg) => AppError::Internal(msg),
            WebBookingError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}
