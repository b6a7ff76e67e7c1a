use assert_matches::assert_matches;
use chrono::NaiveTime;

use availability_cell::{AvailabilityError, BookingConfig};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

#[test]
fn test_accepts_divisor_steps_only() {
    for step in [15, 30, 60] {
        assert!(BookingConfig::new(60, 12, step, 86400).is_ok());
    }
    for step in [0, 10, 20, 45, 90] {
        assert_matches!(
            BookingConfig::new(60, 12, step, 86400),
            Err(AvailabilityError::Config(_))
        );
    }
}

#[test]
fn test_rejects_cache_ttl_below_the_expiry_floor() {
    assert_matches!(
        BookingConfig::new(60, 12, 30, 30),
        Err(AvailabilityError::Config(_))
    );
    assert!(BookingConfig::new(60, 12, 30, 60).is_ok());
}

#[test]
fn test_slots_per_day() {
    let cases = [(15, 96), (30, 48), (60, 24)];
    for (step, expected) in cases {
        let config = BookingConfig::new(60, 12, step, 86400).unwrap();
        assert_eq!(config.slots_per_day(), expected);
    }
}

#[test]
fn test_time_slot_round_trip() {
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();

    assert_eq!(config.time_to_slot(time(0, 0)), 0);
    assert_eq!(config.time_to_slot(time(9, 0)), 18);
    assert_eq!(config.time_to_slot(time(9, 30)), 19);
    assert_eq!(config.time_to_slot(time(23, 30)), 47);

    assert_eq!(config.format_slot_time(0), "00:00");
    assert_eq!(config.format_slot_time(19), "09:30");
    assert_eq!(config.format_slot_time(47), "23:30");
}

#[test]
fn test_parse_slot_label_rejects_unaligned_times() {
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();

    assert_eq!(config.parse_slot_label("09:00"), Some(18));
    assert_eq!(config.parse_slot_label("09:30"), Some(19));
    assert_eq!(config.parse_slot_label("09:15"), None);
    assert_eq!(config.parse_slot_label("garbage"), None);

    let fine = BookingConfig::new(60, 12, 15, 86400).unwrap();
    assert_eq!(fine.parse_slot_label("09:15"), Some(37));
}

#[test]
fn test_slots_needed_rounds_up() {
    let config = BookingConfig::new(60, 12, 30, 86400).unwrap();

    assert_eq!(config.slots_needed(30), 1);
    assert_eq!(config.slots_needed(31), 2);
    assert_eq!(config.slots_needed(60), 2);
    // 90 min service + 15 min break
    assert_eq!(config.slots_needed(105), 4);
    assert_eq!(config.slots_needed(0), 0);
    assert_eq!(config.slots_needed(-30), 0);
}
