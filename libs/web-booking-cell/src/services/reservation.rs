//! Single-slot reservation locks.
//!
//! One value key per `(location, date, time)` triple, written with
//! `SET NX EX` so acquiring the lock and detecting a holder is a single
//! atomic step. A secondary ref key maps reservation id back to the slot
//! key for release and lookup. Both keys share the TTL and self-expire if
//! the visitor abandons checkout.

use chrono::{DateTime, Utc};
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;
use tracing::info;
use uuid::Uuid;

use crate::error::WebBookingError;
use crate::models::{Reservation, SlotSelection};

const RESERVE_PREFIX: &str = "slot_reserve";

pub struct ReservationService {
    pool: Pool,
    ttl_seconds: u64,
}

impl ReservationService {
    pub fn new(pool: Pool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn slot_key(selection: &SlotSelection) -> String {
        format!(
            "{}:{}:{}:{}",
            RESERVE_PREFIX, selection.location_id, selection.date, selection.time
        )
    }

    pub(crate) fn ref_key(id: Uuid) -> String {
        format!("{}:ref:{}", RESERVE_PREFIX, id)
    }

    async fn get_connection(&self) -> Result<Connection, WebBookingError> {
        self.pool
            .get()
            .await
            .map_err(|e| WebBookingError::CachePool(e.to_string()))
    }

    /// Place a hold on the slot. Fails with a conflict when a live
    /// reservation already occupies the exact `(location, date, time)`.
    pub async fn reserve(
        &self,
        selection: SlotSelection,
        now: DateTime<Utc>,
    ) -> Result<Reservation, WebBookingError> {
        if selection.date < now.date_naive() {
            return Err(WebBookingError::Validation(
                "Cannot reserve slots in the past".to_string(),
            ));
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            selection,
            created_at: now,
        };

        let slot_key = Self::slot_key(&reservation.selection);
        let payload = serde_json::to_string(&reservation)?;

        let mut conn = self.get_connection().await?;
        let acquired: Option<String> = redis::cmd("SET")
            .arg(&slot_key)
            .arg(&payload)
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await?;

        if acquired.is_none() {
            return Err(WebBookingError::SlotAlreadyReserved(format!(
                "{} {} at location {}",
                reservation.selection.date,
                reservation.selection.time,
                reservation.selection.location_id
            )));
        }

        let _: () = conn
            .set_ex(Self::ref_key(reservation.id), &slot_key, self.ttl_seconds)
            .await?;

        info!("Slot reserved: {} ({})", slot_key, reservation.id);
        Ok(reservation)
    }

    /// Release a hold early. After release (or TTL expiry) the same triple
    /// is reservable again.
    pub async fn release(&self, id: Uuid) -> Result<(), WebBookingError> {
        let mut conn = self.get_connection().await?;

        let slot_key: Option<String> = conn.get(Self::ref_key(id)).await?;
        let Some(slot_key) = slot_key else {
            return Err(WebBookingError::ReservationNotFound(id));
        };

        let _: () = conn.del(vec![slot_key, Self::ref_key(id)]).await?;
        info!("Slot reservation released: {}", id);
        Ok(())
    }

    /// Look up a live reservation by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Reservation>, WebBookingError> {
        let mut conn = self.get_connection().await?;

        let slot_key: Option<String> = conn.get(Self::ref_key(id)).await?;
        let Some(slot_key) = slot_key else {
            return Ok(None);
        };

        let payload: Option<String> = conn.get(&slot_key).await?;
        let Some(payload) = payload else {
            return Ok(None);
        };

        let reservation: Reservation = serde_json::from_str(&payload)?;
        // The slot key may have been re-acquired by someone else after
        // this reservation expired.
        if reservation.id != id {
            return Ok(None);
        }
        Ok(Some(reservation))
    }
}
