//! Level-1 orchestration: fetch schedule data, compute, cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use deadpool_redis::Pool;
use tracing::{debug, warn};

use shared_database::PlatformDbClient;
use shared_models::{OverrideTarget, WeekSchedule};

use crate::config::BookingConfig;
use crate::error::AvailabilityError;
use crate::models::{DayStatus, GridSlotView, SlotEntry};
use crate::services::calculator::calculate_day_grid;
use crate::services::grid_cache::GridCacheStore;

pub struct GridService {
    db: Arc<PlatformDbClient>,
    store: GridCacheStore,
    config: BookingConfig,
}

impl GridService {
    pub fn new(db: Arc<PlatformDbClient>, pool: Pool, config: BookingConfig) -> Self {
        Self {
            db,
            store: GridCacheStore::new(pool, config),
            config,
        }
    }

    pub fn store(&self) -> &GridCacheStore {
        &self.store
    }

    /// Compute the grid from source data. A missing location yields an
    /// empty day, same as malformed schedule data: closed, never open.
    async fn compute_day(
        &self,
        location_id: i64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<SlotEntry>, AvailabilityError> {
        let location = self
            .db
            .get_location(location_id)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let Some(location) = location.filter(|l| l.is_active) else {
            debug!("Location {} missing or inactive, empty grid", location_id);
            return Ok(Vec::new());
        };

        let schedule = WeekSchedule::parse(location.work_schedule.as_deref());
        let overrides = self
            .db
            .get_overrides(OverrideTarget::Location, location_id, date)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        Ok(calculate_day_grid(&schedule, &overrides, date, &self.config, now))
    }

    /// Live Level-1 labels for a date, computing and caching on a miss.
    /// A cache read failure degrades to a miss; a write failure is logged
    /// and the freshly computed grid is served anyway.
    pub async fn day_labels(
        &self,
        location_id: i64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AvailabilityError> {
        match self.store.get(location_id, date, now).await {
            Ok(Some(labels)) => return Ok(labels),
            Ok(None) => {}
            Err(e) => warn!("Grid cache read failed, recomputing: {}", e),
        }

        let entries = self.compute_day(location_id, date, now).await?;
        if let Err(e) = self.store.set(location_id, date, &entries, now).await {
            warn!("Grid cache write failed, serving computed grid: {}", e);
        }
        Ok(entries.into_iter().map(|entry| entry.label).collect())
    }

    /// Raw grid contents for the debug endpoint, with a cache-hit flag.
    pub async fn raw_grid(
        &self,
        location_id: i64,
        date: NaiveDate,
        force_recalc: bool,
        now: DateTime<Utc>,
    ) -> Result<(Vec<GridSlotView>, bool), AvailabilityError> {
        if !force_recalc {
            if let Some(entries) = self.store.get_entries(location_id, date).await? {
                let slots = entries
                    .into_iter()
                    .map(|(time, expire_at)| GridSlotView { time, expire_at })
                    .collect();
                return Ok((slots, true));
            }
        }

        let entries = self.compute_day(location_id, date, now).await?;
        if let Err(e) = self.store.set(location_id, date, &entries, now).await {
            warn!("Grid cache write failed, serving computed grid: {}", e);
        }
        let slots = entries
            .into_iter()
            .map(|entry| GridSlotView {
                time: entry.label,
                expire_at: entry.expire_at.timestamp(),
            })
            .collect();
        Ok((slots, false))
    }

    /// Per-day availability status over a date range, batch-reading the
    /// cache and batch-storing whatever had to be computed.
    pub async fn calendar(
        &self,
        location_id: i64,
        dates: &[NaiveDate],
        now: DateTime<Utc>,
    ) -> Result<Vec<DayStatus>, AvailabilityError> {
        let cached = match self.store.get_many(location_id, dates, now).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Grid cache batch read failed, recomputing range: {}", e);
                HashMap::new()
            }
        };

        let mut to_store: HashMap<NaiveDate, Vec<SlotEntry>> = HashMap::new();
        let mut days = Vec::with_capacity(dates.len());

        for date in dates {
            let labels = match cached.get(date) {
                Some(Some(labels)) => labels.clone(),
                _ => {
                    let entries = self.compute_day(location_id, *date, now).await?;
                    let labels = entries.iter().map(|entry| entry.label.clone()).collect();
                    to_store.insert(*date, entries);
                    labels
                }
            };
            days.push(DayStatus {
                date: *date,
                has_slots: !labels.is_empty(),
                open_slots_count: labels.len(),
            });
        }

        if !to_store.is_empty() {
            if let Err(e) = self.store.set_many(location_id, &to_store, now).await {
                warn!("Grid cache batch write failed: {}", e);
            }
        }

        Ok(days)
    }
}
