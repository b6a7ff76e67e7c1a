//! Canonical working-hours schedule.
//!
//! Locations and specialists store their weekly hours as a JSON text column.
//! Two legacy encodings exist in the wild:
//!
//! - numeric-weekday keys with a list of interval pairs:
//!   `{"0": [["09:00", "18:00"]], "6": []}`
//! - named-day keys with `null`, a single `{"start", "end"}` object,
//!   a flat `["09:00", "18:00"]` pair, or a list of pairs:
//!   `{"mon": {"start": "09:00", "end": "18:00"}, "sun": null}`
//!
//! Both normalize here, once, into per-weekday `[start, end)` interval lists
//! (Monday = 0). Anything that does not decode is treated as closed, never
//! as open.

use std::collections::HashMap;

use chrono::{NaiveTime, Weekday};
use serde::Deserialize;

const DAY_NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Half-open `[start, end)` interval of wall-clock time within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }
}

/// Normalized weekly schedule: open intervals per weekday, Monday first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSchedule {
    days: [Vec<TimeInterval>; 7],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDay {
    Range { start: String, end: String },
    FlatPair([String; 2]),
    Pairs(Vec<[String; 2]>),
}

impl WeekSchedule {
    /// Decode either legacy encoding. Missing or structurally malformed
    /// input yields a fully closed week; a malformed value under a valid
    /// day key closes only that day.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        let Ok(map) = serde_json::from_str::<HashMap<String, serde_json::Value>>(raw) else {
            return Self::default();
        };

        let mut days: [Vec<TimeInterval>; 7] = Default::default();
        for (key, value) in map {
            let Some(index) = day_index(&key) else {
                continue;
            };
            if value.is_null() {
                continue; // explicit null: day off
            }
            days[index] = match serde_json::from_value::<RawDay>(value) {
                Ok(RawDay::Range { start, end }) => {
                    parse_pair(&start, &end).into_iter().collect()
                }
                Ok(RawDay::FlatPair([start, end])) => {
                    parse_pair(&start, &end).into_iter().collect()
                }
                Ok(RawDay::Pairs(pairs)) => pairs
                    .iter()
                    .filter_map(|[start, end]| parse_pair(start, end))
                    .collect(),
                Err(_) => Vec::new(),
            };
        }

        Self { days }
    }

    pub fn from_intervals(weekday: Weekday, intervals: Vec<TimeInterval>) -> Self {
        let mut schedule = Self::default();
        schedule.days[weekday.num_days_from_monday() as usize] = intervals;
        schedule
    }

    pub fn intervals_for(&self, weekday: Weekday) -> &[TimeInterval] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    pub fn is_closed_all_week(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }
}

/// Parse an `HH:MM` label.
pub fn parse_time_label(label: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(label.trim(), "%H:%M").ok()
}

fn parse_pair(start: &str, end: &str) -> Option<TimeInterval> {
    TimeInterval::new(parse_time_label(start)?, parse_time_label(end)?)
}

fn day_index(key: &str) -> Option<usize> {
    if let Ok(n) = key.parse::<usize>() {
        return (n < 7).then_some(n);
    }
    DAY_NAMES
        .iter()
        .position(|name| key.eq_ignore_ascii_case(name))
}
