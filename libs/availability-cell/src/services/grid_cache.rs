//! Redis persistence for Level-1 grids.
//!
//! One sorted set per (location, date), key `slots:day:{location}:{date}`.
//! Members are `HH:MM` labels scored by their expiry (unix seconds), plus a
//! zero-scored sentinel so that an explicitly empty day is distinguishable
//! from "never computed". Reads are score-range queries above `now`, which
//! excludes both the sentinel and already-expired labels without rewriting
//! the set. Key expiry is set to the latest slot expiry plus a safety
//! margin (or end of day for empty grids), so staleness is bounded without
//! a background sweep.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;
use tracing::debug;

use crate::config::BookingConfig;
use crate::error::AvailabilityError;
use crate::models::SlotEntry;

const KEY_PREFIX: &str = "slots:day";
const SENTINEL: &str = "__grid__";
const EXPIRY_SAFETY_MARGIN_SECS: i64 = 300;

pub struct GridCacheStore {
    pool: Pool,
    config: BookingConfig,
}

impl GridCacheStore {
    pub fn new(pool: Pool, config: BookingConfig) -> Self {
        Self { pool, config }
    }

    fn grid_key(&self, location_id: i64, date: NaiveDate) -> String {
        format!("{}:{}:{}", KEY_PREFIX, location_id, date)
    }

    async fn get_connection(&self) -> Result<Connection, AvailabilityError> {
        self.pool
            .get()
            .await
            .map_err(|e| AvailabilityError::CachePool(e.to_string()))
    }

    /// Live labels for a cached day, or `None` on a true miss. An empty
    /// vector means the day was computed and holds no bookable slots.
    pub async fn get(
        &self,
        location_id: i64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<String>>, AvailabilityError> {
        let mut conn = self.get_connection().await?;
        let key = self.grid_key(location_id, date);

        let exists: bool = conn.exists(&key).await?;
        if !exists {
            return Ok(None);
        }

        let labels: Vec<String> = conn
            .zrangebyscore(&key, format!("({}", now.timestamp()), "+inf")
            .await?;
        Ok(Some(labels))
    }

    /// Full stored contents with per-label expiry, sentinel excluded but
    /// expired labels included (debug view).
    pub async fn get_entries(
        &self,
        location_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Vec<(String, i64)>>, AvailabilityError> {
        let mut conn = self.get_connection().await?;
        let key = self.grid_key(location_id, date);

        let exists: bool = conn.exists(&key).await?;
        if !exists {
            return Ok(None);
        }

        let entries: Vec<(String, i64)> = conn
            .zrangebyscore_withscores(&key, "(0", "+inf")
            .await?;
        Ok(Some(entries))
    }

    /// Number of currently-live labels, or `None` if the day was never
    /// computed.
    pub async fn count_live(
        &self,
        location_id: i64,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<u64>, AvailabilityError> {
        let mut conn = self.get_connection().await?;
        let key = self.grid_key(location_id, date);

        let exists: bool = conn.exists(&key).await?;
        if !exists {
            return Ok(None);
        }

        let count: u64 = conn
            .zcount(&key, format!("({}", now.timestamp()), "+inf")
            .await?;
        Ok(Some(count))
    }

    pub async fn set(
        &self,
        location_id: i64,
        date: NaiveDate,
        entries: &[SlotEntry],
        now: DateTime<Utc>,
    ) -> Result<(), AvailabilityError> {
        let mut conn = self.get_connection().await?;
        let mut pipe = redis::pipe();
        self.append_set_commands(&mut pipe, location_id, date, entries, now);
        pipe.query_async::<_, ()>(&mut conn).await?;
        debug!(
            "Cached grid for location {} on {} ({} slots)",
            location_id,
            date,
            entries.len()
        );
        Ok(())
    }

    /// Batch read: one pipelined existence check, then one pipelined
    /// score-range read for the cached days.
    pub async fn get_many(
        &self,
        location_id: i64,
        dates: &[NaiveDate],
        now: DateTime<Utc>,
    ) -> Result<HashMap<NaiveDate, Option<Vec<String>>>, AvailabilityError> {
        let mut result = HashMap::new();
        if dates.is_empty() {
            return Ok(result);
        }

        let mut conn = self.get_connection().await?;

        let mut exists_pipe = redis::pipe();
        for date in dates {
            exists_pipe.exists(self.grid_key(location_id, *date));
        }
        let flags: Vec<bool> = exists_pipe.query_async(&mut conn).await?;

        let cached_dates: Vec<NaiveDate> = dates
            .iter()
            .zip(&flags)
            .filter_map(|(date, exists)| exists.then_some(*date))
            .collect();

        let min_score = format!("({}", now.timestamp());
        let mut read_pipe = redis::pipe();
        for date in &cached_dates {
            read_pipe.zrangebyscore(self.grid_key(location_id, *date), &min_score, "+inf");
        }
        let grids: Vec<Vec<String>> = if cached_dates.is_empty() {
            Vec::new()
        } else {
            read_pipe.query_async(&mut conn).await?
        };

        for date in dates {
            result.insert(*date, None);
        }
        for (date, labels) in cached_dates.into_iter().zip(grids) {
            result.insert(date, Some(labels));
        }
        Ok(result)
    }

    /// Batch write in a single pipeline.
    pub async fn set_many(
        &self,
        location_id: i64,
        grids: &HashMap<NaiveDate, Vec<SlotEntry>>,
        now: DateTime<Utc>,
    ) -> Result<(), AvailabilityError> {
        if grids.is_empty() {
            return Ok(());
        }
        let mut conn = self.get_connection().await?;
        let mut pipe = redis::pipe();
        for (date, entries) in grids {
            self.append_set_commands(&mut pipe, location_id, *date, entries, now);
        }
        pipe.query_async::<_, ()>(&mut conn).await?;
        debug!(
            "Cached {} grids for location {}",
            grids.len(),
            location_id
        );
        Ok(())
    }

    /// Delete cached grids for specific dates, or every cached date for the
    /// location when `dates` is `None`. Returns the number of removed keys.
    pub async fn delete(
        &self,
        location_id: i64,
        dates: Option<&[NaiveDate]>,
    ) -> Result<u64, AvailabilityError> {
        let mut conn = self.get_connection().await?;

        let keys: Vec<String> = match dates {
            Some(dates) => dates
                .iter()
                .map(|date| self.grid_key(location_id, *date))
                .collect(),
            None => {
                let pattern = format!("{}:{}:*", KEY_PREFIX, location_id);
                let mut keys = Vec::new();
                let mut iter: redis::AsyncIter<String> = conn.scan_match(&pattern).await?;
                while let Some(key) = iter.next_item().await {
                    keys.push(key);
                }
                keys
            }
        };

        if keys.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn.del(&keys).await?;
        Ok(removed)
    }

    fn append_set_commands(
        &self,
        pipe: &mut redis::Pipeline,
        location_id: i64,
        date: NaiveDate,
        entries: &[SlotEntry],
        now: DateTime<Utc>,
    ) {
        let key = self.grid_key(location_id, date);
        pipe.del(&key).ignore();
        pipe.zadd(&key, SENTINEL, 0).ignore();
        for entry in entries {
            pipe.zadd(&key, &entry.label, entry.expire_at.timestamp())
                .ignore();
        }
        pipe.expire_at(&key, self.key_expiry(entries, date, now))
            .ignore();
    }

    /// Non-empty grids expire shortly after their last slot does; empty
    /// grids at end of day. Bounded below so past dates still get a key
    /// that can answer "computed, nothing open" for a short while.
    /// `BookingConfig` guarantees the TTL cap is above the floor.
    fn key_expiry(&self, entries: &[SlotEntry], date: NaiveDate, now: DateTime<Utc>) -> i64 {
        let expiry = entries
            .iter()
            .map(|entry| entry.expire_at.timestamp() + EXPIRY_SAFETY_MARGIN_SECS)
            .max()
            .unwrap_or_else(|| {
                (date + Duration::days(1))
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| dt.and_utc().timestamp())
                    .unwrap_or_else(|| now.timestamp())
            });
        let ttl_cap = now.timestamp() + self.config.cache_ttl_seconds as i64;
        expiry.clamp(
            now.timestamp() + crate::config::MIN_CACHE_TTL_SECS as i64,
            ttl_cap,
        )
    }
}
