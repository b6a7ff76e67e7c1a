//! Level 1: base location grid calculation.
//!
//! The grid reflects the location's work schedule, its calendar overrides
//! and the minimum advance notice. Specialists, bookings and rooms are
//! Level-2 concerns and never appear here.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use shared_models::{CalendarOverride, TimeInterval, WeekSchedule};

use crate::config::BookingConfig;
use crate::models::SlotEntry;

/// Intervals dictated by covering overrides, or `None` when no override
/// covers `date` and the weekly schedule decides.
///
/// Any covering day-off override closes the day; otherwise decodable
/// `HH:MM-HH:MM` custom hours replace the schedule; a covering override
/// that decodes to nothing usable blocks the whole day. Unparseable data
/// closes, never opens.
pub fn override_intervals(
    overrides: &[CalendarOverride],
    date: NaiveDate,
) -> Option<Vec<TimeInterval>> {
    let covering: Vec<&CalendarOverride> =
        overrides.iter().filter(|o| o.covers(date)).collect();

    if covering.is_empty() {
        return None;
    }
    if covering.iter().any(|o| o.is_day_off()) {
        return Some(Vec::new());
    }
    Some(covering.iter().filter_map(|o| o.custom_hours()).collect())
}

/// Resolve the intervals that actually apply on `date`: covering overrides
/// take precedence over the weekly schedule.
pub fn effective_intervals(
    schedule: &WeekSchedule,
    overrides: &[CalendarOverride],
    date: NaiveDate,
) -> Vec<TimeInterval> {
    override_intervals(overrides, date)
        .unwrap_or_else(|| schedule.intervals_for(date.weekday()).to_vec())
}

/// Compute the ordered Level-1 grid for one (location, date).
///
/// Each emitted slot carries `expire_at = slot_start - min_advance_hours`
/// and only slots with `expire_at > now` are emitted, so the advance-notice
/// rule is baked into the artifact itself: later readers filter by score
/// instead of re-applying it.
pub fn calculate_day_grid(
    schedule: &WeekSchedule,
    overrides: &[CalendarOverride],
    date: NaiveDate,
    config: &BookingConfig,
    now: DateTime<Utc>,
) -> Vec<SlotEntry> {
    let intervals = effective_intervals(schedule, overrides, date);

    let mut entries: BTreeMap<usize, SlotEntry> = BTreeMap::new();
    let step = Duration::minutes(config.slot_step_minutes as i64);
    let day_start = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    let Some(day_start) = day_start else {
        return Vec::new();
    };

    for interval in intervals {
        let start_slot = config.time_to_slot(interval.start);
        let end_slot = config.time_to_slot(interval.end);

        for slot in start_slot..end_slot {
            let slot_start = day_start + step * slot as i32;
            let expire_at = slot_start - Duration::hours(config.min_advance_hours);
            if expire_at > now {
                entries.insert(
                    slot,
                    SlotEntry {
                        label: config.format_slot_time(slot),
                        slot_index: slot,
                        expire_at,
                    },
                );
            }
        }
    }

    entries.into_values().collect()
}
