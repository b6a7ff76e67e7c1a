use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slot a public visitor picked during checkout. The time is kept as
/// the `HH:MM` grid label so the record round-trips unchanged into the
/// trusted booking-creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    pub location_id: i64,
    pub service_id: i64,
    pub specialist_id: Option<i64>,
    pub date: NaiveDate,
    pub time: String,
}

/// A short-lived single-slot lock. Not an availability check — Level 2
/// already did that — just a guard against two visitors completing
/// checkout for the same opening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    #[serde(flatten)]
    pub selection: SlotSelection,
    pub created_at: DateTime<Utc>,
}

pub type ReserveRequest = SlotSelection;

#[derive(Debug, Clone, Serialize)]
pub struct ReserveResponse {
    pub id: Uuid,
    /// Seconds until the reservation self-expires.
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebBookingRequest {
    pub reservation_id: Uuid,
    pub phone: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingStatus {
    Pending,
    Processing,
    Confirmed,
    Failed,
}

impl PendingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PendingStatus::Confirmed | PendingStatus::Failed)
    }
}

/// The ephemeral record behind the public booking flow. Created from a
/// live reservation, resolved by the processor, then retained briefly for
/// client polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingWebBooking {
    pub id: Uuid,
    pub reservation_id: Uuid,
    #[serde(flatten)]
    pub selection: SlotSelection,
    pub phone: String,
    pub name: Option<String>,
    pub status: PendingStatus,
    pub booking_id: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PendingWebBooking {
    pub fn new(reservation: &Reservation, request: &WebBookingRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reservation_id: reservation.id,
            selection: reservation.selection.clone(),
            phone: request.phone.clone(),
            name: request.name.clone(),
            status: PendingStatus::Pending,
            booking_id: None,
            error: None,
            created_at: now,
            resolved_at: None,
        }
    }
}

/// Status view returned to polling clients.
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusResponse {
    pub id: Uuid,
    pub status: PendingStatus,
    pub booking_id: Option<i64>,
    pub error: Option<String>,
}

impl From<&PendingWebBooking> for BookingStatusResponse {
    fn from(booking: &PendingWebBooking) -> Self {
        Self {
            id: booking.id,
            status: booking.status,
            booking_id: booking.booking_id,
            error: booking.error.clone(),
        }
    }
}
