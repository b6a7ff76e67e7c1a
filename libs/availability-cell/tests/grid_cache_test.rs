//! Grid cache integration tests. These need a reachable Redis (REDIS_URL
//! or localhost:6379) and are ignored by default:
//! `cargo test -- --ignored`.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use deadpool_redis::{Config, Pool, Runtime};

use availability_cell::services::grid_cache::GridCacheStore;
use availability_cell::services::invalidator::CacheInvalidator;
use availability_cell::{BookingConfig, SlotEntry};

fn test_pool() -> Pool {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    Config::from_url(url)
        .create_pool(Some(Runtime::Tokio1))
        .expect("Failed to create Redis pool")
}

fn store() -> GridCacheStore {
    GridCacheStore::new(test_pool(), BookingConfig::new(60, 12, 30, 86400).unwrap())
}

// Unique per test run so parallel/repeated runs never collide.
fn fresh_location_id() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

fn entry(config: &BookingConfig, slot: usize, expire_at: chrono::DateTime<Utc>) -> SlotEntry {
    SlotEntry {
        label: config.format_slot_time(slot),
        slot_index: slot,
        expire_at,
    }
}

#[tokio::test]
#[ignore]
async fn test_set_then_get_returns_live_labels() {
    let store = store();
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();
    let location_id = fresh_location_id();
    let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let now = Utc::now();

    let entries = vec![
        entry(&config, 18, now + Duration::hours(1)),
        entry(&config, 19, now + Duration::hours(2)),
    ];
    store.set(location_id, date, &entries, now).await.unwrap();

    let labels = store.get(location_id, date, now).await.unwrap();
    assert_eq!(labels, Some(vec!["09:00".to_string(), "09:30".to_string()]));

    store.delete(location_id, None).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_computed_empty_day_is_not_a_miss() {
    let store = store();
    let location_id = fresh_location_id();
    let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let now = Utc::now();

    assert_eq!(store.get(location_id, date, now).await.unwrap(), None);

    store.set(location_id, date, &[], now).await.unwrap();

    // Sentinel makes the empty day visible as "computed, nothing open"
    assert_eq!(store.get(location_id, date, now).await.unwrap(), Some(vec![]));
    assert_eq!(store.count_live(location_id, date, now).await.unwrap(), Some(0));

    store.delete(location_id, None).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_expired_labels_are_excluded_from_reads() {
    let store = store();
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();
    let location_id = fresh_location_id();
    let date = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let now = Utc::now();

    let entries = vec![
        entry(&config, 18, now - Duration::hours(1)),
        entry(&config, 19, now + Duration::hours(1)),
    ];
    store.set(location_id, date, &entries, now).await.unwrap();

    let labels = store.get(location_id, date, now).await.unwrap();
    assert_eq!(labels, Some(vec!["09:30".to_string()]));

    // The debug view still shows expired labels, sentinel excluded
    let stored = store.get_entries(location_id, date).await.unwrap().unwrap();
    assert_eq!(stored.len(), 2);

    assert_eq!(store.count_live(location_id, date, now).await.unwrap(), Some(1));

    store.delete(location_id, None).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_get_many_and_set_many_round_trip() {
    let store = store();
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();
    let location_id = fresh_location_id();
    let now = Utc::now();

    let day1 = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2026, 9, 8).unwrap();
    let day3 = NaiveDate::from_ymd_opt(2026, 9, 9).unwrap();

    let mut grids = HashMap::new();
    grids.insert(day1, vec![entry(&config, 18, now + Duration::hours(1))]);
    grids.insert(day2, Vec::new());
    store.set_many(location_id, &grids, now).await.unwrap();

    let result = store
        .get_many(location_id, &[day1, day2, day3], now)
        .await
        .unwrap();

    assert_eq!(result[&day1], Some(vec!["09:00".to_string()]));
    assert_eq!(result[&day2], Some(vec![]));
    assert_eq!(result[&day3], None);

    store.delete(location_id, None).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_delete_specific_dates_and_wildcard() {
    let store = store();
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();
    let location_id = fresh_location_id();
    let now = Utc::now();

    let day1 = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2026, 9, 8).unwrap();
    let entries = vec![entry(&config, 18, now + Duration::hours(1))];
    store.set(location_id, day1, &entries, now).await.unwrap();
    store.set(location_id, day2, &entries, now).await.unwrap();

    let removed = store.delete(location_id, Some(&[day1])).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.get(location_id, day1, now).await.unwrap(), None);
    assert!(store.get(location_id, day2, now).await.unwrap().is_some());

    let removed = store.delete(location_id, None).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.get(location_id, day2, now).await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_invalidate_range_removes_exactly_the_covered_dates() {
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();
    let store = GridCacheStore::new(test_pool(), config);
    let invalidator = CacheInvalidator::new(test_pool(), config);
    let location_id = fresh_location_id();
    let now = Utc::now();

    let day1 = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2026, 9, 8).unwrap();
    let day3 = NaiveDate::from_ymd_opt(2026, 9, 9).unwrap();
    let entries = vec![entry(&config, 18, now + Duration::hours(1))];
    for day in [day1, day2, day3] {
        store.set(location_id, day, &entries, now).await.unwrap();
    }

    // Reversed bounds cover day1..=day2
    let removed = invalidator
        .invalidate_range(location_id, day2, day1)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.get(location_id, day1, now).await.unwrap(), None);
    assert!(store.get(location_id, day3, now).await.unwrap().is_some());

    store.delete(location_id, None).await.unwrap();
}
