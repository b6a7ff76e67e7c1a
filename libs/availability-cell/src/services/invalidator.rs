//! Cache invalidation for location grids.
//!
//! Triggers: a location work-schedule update (all cached dates) and a
//! location-scoped calendar-override create/delete (exactly its date
//! range). Booking changes, specialist schedule/override changes and room
//! changes are deliberate non-triggers: they only affect Level 2, which is
//! never cached.

use chrono::{Duration, NaiveDate};
use deadpool_redis::Pool;
use tracing::info;

use crate::config::BookingConfig;
use crate::error::AvailabilityError;
use crate::services::grid_cache::GridCacheStore;

pub struct CacheInvalidator {
    store: GridCacheStore,
}

impl CacheInvalidator {
    pub fn new(pool: Pool, config: BookingConfig) -> Self {
        Self {
            store: GridCacheStore::new(pool, config),
        }
    }

    /// Remove cached grids for the given dates, or all cached dates for
    /// the location when `dates` is `None`. Returns the number of removed
    /// keys.
    pub async fn invalidate(
        &self,
        location_id: i64,
        dates: Option<&[NaiveDate]>,
    ) -> Result<u64, AvailabilityError> {
        let removed = self.store.delete(location_id, dates).await?;
        info!(
            "Invalidated {} cached grids for location {}",
            removed, location_id
        );
        Ok(removed)
    }

    /// Invalidate exactly the dates a range covers, bounds inclusive and
    /// order-tolerant. Used when a location-scoped override is created or
    /// deleted.
    pub async fn invalidate_range(
        &self,
        location_id: i64,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<u64, AvailabilityError> {
        let dates = dates_in_range(date_start, date_end);
        self.invalidate(location_id, Some(&dates)).await
    }
}

/// Inclusive list of dates between the bounds, tolerant of swapped order.
pub fn dates_in_range(date_start: NaiveDate, date_end: NaiveDate) -> Vec<NaiveDate> {
    let (start, end) = if date_start <= date_end {
        (date_start, date_end)
    } else {
        (date_end, date_start)
    };

    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}
