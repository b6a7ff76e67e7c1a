use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use web_booking_cell::{
    PendingStatus, PendingWebBooking, Reservation, ReservationService, SlotSelection,
    WebBookingRequest,
};

fn selection() -> SlotSelection {
    SlotSelection {
        location_id: 3,
        service_id: 7,
        specialist_id: Some(11),
        date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
        time: "09:30".to_string(),
    }
}

#[test]
fn test_status_terminality() {
    assert!(!PendingStatus::Pending.is_terminal());
    assert!(!PendingStatus::Processing.is_terminal());
    assert!(PendingStatus::Confirmed.is_terminal());
    assert!(PendingStatus::Failed.is_terminal());
}

#[test]
fn test_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&PendingStatus::Pending).unwrap(), "\"pending\"");
    assert_eq!(serde_json::to_string(&PendingStatus::Failed).unwrap(), "\"failed\"");
    assert_eq!(
        serde_json::from_str::<PendingStatus>("\"processing\"").unwrap(),
        PendingStatus::Processing
    );
}

#[test]
fn test_slot_key_pins_the_exact_triple() {
    let key = ReservationService::slot_key(&selection());
    assert_eq!(key, "slot_reserve:3:2026-09-07:09:30");
}

#[test]
fn test_pending_booking_created_from_reservation() {
    let now = Utc::now();
    let reservation = Reservation {
        id: Uuid::new_v4(),
        selection: selection(),
        created_at: now,
    };
    let request = WebBookingRequest {
        reservation_id: reservation.id,
        phone: "+4915112345678".to_string(),
        name: Some("Mara".to_string()),
    };

    let booking = PendingWebBooking::new(&reservation, &request, now);

    assert_eq!(booking.status, PendingStatus::Pending);
    assert_eq!(booking.reservation_id, reservation.id);
    assert_eq!(booking.selection, reservation.selection);
    assert_eq!(booking.phone, "+4915112345678");
    assert!(booking.booking_id.is_none());
    assert!(booking.error.is_none());
    assert!(booking.resolved_at.is_none());
}

#[test]
fn test_pending_booking_json_round_trip() {
    let now = Utc::now();
    let reservation = Reservation {
        id: Uuid::new_v4(),
        selection: selection(),
        created_at: now,
    };
    let request = WebBookingRequest {
        reservation_id: reservation.id,
        phone: "+4915112345678".to_string(),
        name: None,
    };
    let mut booking = PendingWebBooking::new(&reservation, &request, now);
    booking.status = PendingStatus::Failed;
    booking.error = Some("Slot no longer available".to_string());

    let raw = serde_json::to_string(&booking).unwrap();
    let decoded: PendingWebBooking = serde_json::from_str(&raw).unwrap();

    assert_eq!(decoded.id, booking.id);
    assert_eq!(decoded.status, PendingStatus::Failed);
    assert_eq!(decoded.selection, booking.selection);
    assert_eq!(decoded.error.as_deref(), Some("Slot no longer available"));

    // Selection fields flatten into the record for the downstream call
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["location_id"], 3);
    assert_eq!(value["time"], "09:30");
}
