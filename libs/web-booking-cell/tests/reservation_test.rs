//! Reservation lock integration tests. These need a reachable Redis
//! (REDIS_URL or localhost:6379) and are ignored by default:
//! `cargo test -- --ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use deadpool_redis::{Config, Pool, Runtime};
use uuid::Uuid;

use web_booking_cell::{ReservationService, SlotSelection, WebBookingError};

fn test_pool() -> Pool {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    Config::from_url(url)
        .create_pool(Some(Runtime::Tokio1))
        .expect("Failed to create Redis pool")
}

// Unique location per test so parallel/repeated runs never collide.
fn fresh_selection() -> SlotSelection {
    SlotSelection {
        location_id: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        service_id: 7,
        specialist_id: None,
        date: Utc::now().date_naive() + Duration::days(1),
        time: "09:30".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn test_reserve_is_exclusive_per_slot() {
    let service = ReservationService::new(test_pool(), 60);
    let selection = fresh_selection();
    let now = Utc::now();

    let reservation = service.reserve(selection.clone(), now).await.unwrap();

    let second = service.reserve(selection.clone(), now).await;
    assert_matches!(second, Err(WebBookingError::SlotAlreadyReserved(_)));

    // A different time on the same day is a different lock
    let mut other = selection.clone();
    other.time = "10:00".to_string();
    let other_reservation = service.reserve(other, now).await.unwrap();

    service.release(reservation.id).await.unwrap();
    service.release(other_reservation.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_release_frees_the_slot() {
    let service = ReservationService::new(test_pool(), 60);
    let selection = fresh_selection();
    let now = Utc::now();

    let reservation = service.reserve(selection.clone(), now).await.unwrap();
    service.release(reservation.id).await.unwrap();

    assert!(service.get(reservation.id).await.unwrap().is_none());

    let again = service.reserve(selection, now).await.unwrap();
    service.release(again.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_release_unknown_reservation_is_not_found() {
    let service = ReservationService::new(test_pool(), 60);

    let result = service.release(Uuid::new_v4()).await;
    assert_matches!(result, Err(WebBookingError::ReservationNotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_get_returns_the_stored_selection() {
    let service = ReservationService::new(test_pool(), 60);
    let selection = fresh_selection();

    let reservation = service.reserve(selection.clone(), Utc::now()).await.unwrap();
    let loaded = service.get(reservation.id).await.unwrap().unwrap();

    assert_eq!(loaded.id, reservation.id);
    assert_eq!(loaded.selection, selection);

    service.release(reservation.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_past_dates_are_rejected() {
    let service = ReservationService::new(test_pool(), 60);
    let mut selection = fresh_selection();
    selection.date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    let result = service.reserve(selection, Utc::now()).await;
    assert_matches!(result, Err(WebBookingError::Validation(_)));
}
