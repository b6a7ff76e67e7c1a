use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format version of the cached grid artifact, reported by the debug
/// endpoint. Bump when the sorted-set layout changes.
pub const GRID_SCHEMA_VERSION: u32 = 2;

/// One open Level-1 slot: a time label plus the instant it stops being
/// bookable (slot start minus the minimum advance notice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotEntry {
    pub label: String,
    pub slot_index: usize,
    pub expire_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub date: NaiveDate,
    pub has_slots: bool,
    pub open_slots_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub location_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayStatus>,
    pub horizon_days: u32,
    pub min_advance_hours: i64,
    pub slot_step_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialistRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableTime {
    pub time: String,
    pub slot_index: usize,
    pub specialists: Vec<SpecialistRef>,
}

/// Level-2 result. Ephemeral by design: never persisted, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceAvailability {
    pub location_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
    pub service_duration_min: i64,
    pub slots_needed: usize,
    pub available_times: Vec<AvailableTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSlotView {
    pub time: String,
    pub expire_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridResponse {
    pub location_id: i64,
    pub date: NaiveDate,
    pub slots: Vec<GridSlotView>,
    pub live_slots: u64,
    pub cached: bool,
    pub schema_version: u32,
    pub slots_per_day: usize,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub location_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub location_id: i64,
    pub service_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct GridQuery {
    pub location_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub force_recalc: bool,
}

/// Invalidation scope: explicit dates, an inclusive date range (override
/// create/delete), or the whole location when all are omitted.
#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub location_id: i64,
    #[serde(default)]
    pub dates: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub date_start: Option<NaiveDate>,
    #[serde(default)]
    pub date_end: Option<NaiveDate>,
}
