//! Level 2: service availability for a specific day.
//!
//! Narrows the cached Level-1 grid down to starts where at least one
//! qualified specialist can take the whole appointment: their own schedule
//! and overrides, minus slots already covered by their pending/confirmed
//! bookings. Runs synchronously within the serving request and is
//! deliberately never cached: specialist schedules, overrides and bookings
//! are each independently volatile, and caching their cross-product would
//! create a combinatorial invalidation problem while the underlying
//! Level-1 lookup is already cheap.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use deadpool_redis::Pool;
use tracing::debug;

use shared_database::PlatformDbClient;
use shared_models::{
    Booking, CalendarOverride, OverrideTarget, Specialist, TimeInterval, WeekSchedule,
};

use crate::config::BookingConfig;
use crate::error::AvailabilityError;
use crate::models::{AvailableTime, ServiceAvailability, SpecialistRef};
use crate::services::calculator::override_intervals;
use crate::services::grid::GridService;

pub struct AvailabilityService {
    db: Arc<PlatformDbClient>,
    grid: GridService,
    config: BookingConfig,
}

impl AvailabilityService {
    pub fn new(db: Arc<PlatformDbClient>, pool: Pool, config: BookingConfig) -> Self {
        Self {
            grid: GridService::new(db.clone(), pool, config),
            db,
            config,
        }
    }

    pub async fn resolve(
        &self,
        location_id: i64,
        service_id: i64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ServiceAvailability, AvailabilityError> {
        let labels = self.grid.day_labels(location_id, date, now).await?;
        let base: BTreeSet<usize> = labels
            .iter()
            .filter_map(|label| self.config.parse_slot_label(label))
            .collect();

        let service = self
            .db
            .get_service(service_id)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?
            .ok_or(AvailabilityError::ServiceNotFound(service_id))?;

        let slots_needed = self.config.slots_needed(service.footprint_min());

        let specialists = self
            .db
            .get_service_specialists(service_id)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let mut per_specialist: Vec<(Specialist, BTreeSet<usize>)> =
            Vec::with_capacity(specialists.len());
        for specialist in specialists {
            let overrides = self
                .db
                .get_overrides(OverrideTarget::Specialist, specialist.id, date)
                .await
                .map_err(|e| AvailabilityError::Database(e.to_string()))?;
            let bookings = self
                .db
                .get_specialist_bookings(specialist.id, date)
                .await
                .map_err(|e| AvailabilityError::Database(e.to_string()))?;

            let schedule = specialist
                .work_schedule
                .as_deref()
                .map(|raw| WeekSchedule::parse(Some(raw)));
            let open = specialist_open_slots(
                &base,
                schedule.as_ref(),
                &overrides,
                &bookings,
                date,
                &self.config,
            );
            per_specialist.push((specialist, open));
        }

        let available_times = available_starts(&base, &per_specialist, slots_needed, &self.config);

        debug!(
            "Resolved {} bookable starts for service {} at location {} on {}",
            available_times.len(),
            service_id,
            location_id,
            date
        );

        Ok(ServiceAvailability {
            location_id,
            service_id,
            date,
            service_duration_min: service.duration_min,
            slots_needed,
            available_times,
        })
    }
}

/// One specialist's bookable slot set for the day: the Level-1 set
/// intersected with their own schedule and overrides (same day-off /
/// custom-hours / fail-closed policy as Level 1), minus slots covered by
/// their existing bookings. Each booking occupies
/// `ceil((duration + break) / step)` consecutive slots from its start.
///
/// A specialist without a schedule of their own (`None`) inherits the full
/// location grid; only their overrides and bookings narrow it. A schedule
/// that is present but malformed still closes the week.
pub fn specialist_open_slots(
    base: &BTreeSet<usize>,
    schedule: Option<&WeekSchedule>,
    overrides: &[CalendarOverride],
    bookings: &[Booking],
    date: NaiveDate,
    config: &BookingConfig,
) -> BTreeSet<usize> {
    let mut open = match (override_intervals(overrides, date), schedule) {
        (Some(intervals), _) => restrict_to_intervals(base, &intervals, config),
        (None, Some(schedule)) => {
            restrict_to_intervals(base, schedule.intervals_for(date.weekday()), config)
        }
        (None, None) => base.clone(),
    };

    for booking in bookings {
        if booking.date_start.date() != date {
            continue;
        }
        let start_slot = config.time_to_slot(booking.date_start.time());
        let occupied = config.slots_needed(booking.footprint_min());
        let end_slot = (start_slot + occupied).min(config.slots_per_day());
        for slot in start_slot..end_slot {
            open.remove(&slot);
        }
    }

    open
}

fn restrict_to_intervals(
    base: &BTreeSet<usize>,
    intervals: &[TimeInterval],
    config: &BookingConfig,
) -> BTreeSet<usize> {
    let mut open = BTreeSet::new();
    for interval in intervals {
        for slot in config.time_to_slot(interval.start)..config.time_to_slot(interval.end) {
            if base.contains(&slot) {
                open.insert(slot);
            }
        }
    }
    open
}

/// Candidate starts in ascending order. A start is emitted only if at
/// least one specialist has the full run of `slots_needed` consecutive
/// slots free; runs that would cross midnight are discarded.
pub fn available_starts(
    base: &BTreeSet<usize>,
    per_specialist: &[(Specialist, BTreeSet<usize>)],
    slots_needed: usize,
    config: &BookingConfig,
) -> Vec<AvailableTime> {
    let mut out = Vec::new();
    if slots_needed == 0 || per_specialist.is_empty() {
        return out;
    }

    for &start in base {
        if start + slots_needed > config.slots_per_day() {
            continue;
        }
        let run = start..start + slots_needed;
        let specialists: Vec<SpecialistRef> = per_specialist
            .iter()
            .filter(|(_, open)| run.clone().all(|slot| open.contains(&slot)))
            .map(|(specialist, _)| SpecialistRef {
                id: specialist.id,
                name: specialist.display_label(),
            })
            .collect();

        if !specialists.is_empty() {
            out.push(AvailableTime {
                time: config.format_slot_time(start),
                slot_index: start,
                specialists,
            });
        }
    }

    out
}
