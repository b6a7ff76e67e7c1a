//! Row types read from the platform persistence API.
//!
//! These are read-only inside the availability engine; the CRUD layer owns
//! all writes.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schedule::{parse_time_label, TimeInterval};

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub work_schedule: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Specialist {
    pub id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub work_schedule: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Specialist {
    pub fn display_label(&self) -> String {
        self.display_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Specialist {}", self.id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub duration_min: i64,
    #[serde(default)]
    pub break_min: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Service {
    /// Grid footprint in minutes: break time occupies slots even though it
    /// is not part of the user-visible duration.
    pub fn footprint_min(&self) -> i64 {
        self.duration_min + self.break_min.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub specialist_id: i64,
    pub date_start: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub break_minutes: Option<i64>,
    pub status: String,
}

impl Booking {
    pub fn footprint_min(&self) -> i64 {
        self.duration_minutes.unwrap_or(60) + self.break_minutes.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    Location,
    Specialist,
}

impl OverrideTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideTarget::Location => "location",
            OverrideTarget::Specialist => "specialist",
        }
    }
}

/// Dated exception layered on a schedule: a closure (`day_off`) or custom
/// hours carried as `HH:MM-HH:MM` in the free-text reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarOverride {
    pub id: i64,
    pub target_type: String,
    #[serde(default)]
    pub target_id: Option<i64>,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub override_kind: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CalendarOverride {
    /// Inclusive date-range check, tolerant of swapped bounds.
    pub fn covers(&self, date: NaiveDate) -> bool {
        let (start, end) = if self.date_start <= self.date_end {
            (self.date_start, self.date_end)
        } else {
            (self.date_end, self.date_start)
        };
        start <= date && date <= end
    }

    pub fn is_day_off(&self) -> bool {
        self.override_kind == "day_off"
    }

    /// Decode an `HH:MM-HH:MM` custom interval from the reason text.
    pub fn custom_hours(&self) -> Option<TimeInterval> {
        let reason = self.reason.as_deref()?.trim();
        let captures = custom_hours_pattern().captures(reason)?;
        let start = parse_time_label(captures.get(1)?.as_str())?;
        let end = parse_time_label(captures.get(2)?.as_str())?;
        TimeInterval::new(start, end)
    }
}

fn custom_hours_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d{2}:\d{2})-(\d{2}:\d{2})$").expect("valid pattern"))
}

fn default_true() -> bool {
    true
}
