//! Pending-booking storage and the trusted processor task.
//!
//! Creation stores the JSON record under `pending_booking:{uuid}` with a
//! TTL and pushes the id onto `pending_booking:queue`. A single sequential
//! consumer claims ids with RPOP, flips each record to `processing`
//! *before* issuing the downstream call (a crash mid-call is visible as a
//! record stuck in `processing`, never a silent re-attempt), then POSTs
//! the trusted booking-creation endpoint. Both downstream rejections and
//! transport failures are terminal; the caller re-reserves and resubmits.
//! Terminal records are re-saved with their remaining TTL for polling.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::WebBookingError;
use crate::models::{PendingStatus, PendingWebBooking};
use crate::services::reservation::ReservationService;

const PENDING_PREFIX: &str = "pending_booking";
const QUEUE_KEY: &str = "pending_booking:queue";
const ERROR_BACKOFF_SECS: u64 = 5;
const DOWNSTREAM_TIMEOUT_SECS: u64 = 30;

pub struct PendingBookingService {
    pool: Pool,
    ttl_seconds: u64,
}

impl PendingBookingService {
    pub fn new(pool: Pool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn record_key(id: Uuid) -> String {
        format!("{}:{}", PENDING_PREFIX, id)
    }

    async fn get_connection(&self) -> Result<Connection, WebBookingError> {
        self.pool
            .get()
            .await
            .map_err(|e| WebBookingError::CachePool(e.to_string()))
    }

    /// Store the record and enqueue its id for the processor.
    pub async fn create(&self, booking: &PendingWebBooking) -> Result<(), WebBookingError> {
        let mut conn = self.get_connection().await?;
        let payload = serde_json::to_string(booking)?;

        let _: () = conn
            .set_ex(Self::record_key(booking.id), payload, self.ttl_seconds)
            .await?;
        let _: () = conn.lpush(QUEUE_KEY, booking.id.to_string()).await?;

        info!("Pending booking created: {}", booking.id);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<PendingWebBooking>, WebBookingError> {
        let mut conn = self.get_connection().await?;
        let payload: Option<String> = conn.get(Self::record_key(id)).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

/// Long-running consumer task, spawned once at startup. Cancellation is
/// cooperative between passes: aborting the task never interrupts a
/// downstream call that has already started within the current claim.
pub async fn run_pending_booking_processor(pool: Pool, config: Arc<AppConfig>) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(DOWNSTREAM_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Pending booking processor failed to start: {}", e);
            return;
        }
    };

    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.processor_poll_interval_seconds.max(1)));
    info!("Pending booking processor started");

    loop {
        ticker.tick().await;
        if let Err(e) = process_queue(&pool, &client, &config).await {
            error!("Pending booking pass failed, backing off: {}", e);
            tokio::time::sleep(Duration::from_secs(ERROR_BACKOFF_SECS)).await;
        }
    }
}

/// Drain the queue sequentially. One claim at a time bounds load on the
/// downstream system.
pub async fn process_queue(
    pool: &Pool,
    client: &reqwest::Client,
    config: &AppConfig,
) -> Result<(), WebBookingError> {
    let mut conn = pool
        .get()
        .await
        .map_err(|e| WebBookingError::CachePool(e.to_string()))?;

    loop {
        let claimed: Option<String> = conn.rpop(QUEUE_KEY, None).await?;
        let Some(claimed) = claimed else {
            return Ok(());
        };

        let Ok(id) = Uuid::parse_str(&claimed) else {
            warn!("Discarding malformed queue entry: {}", claimed);
            continue;
        };

        process_claimed(&mut conn, client, config, id).await?;
    }
}

async fn process_claimed(
    conn: &mut Connection,
    client: &reqwest::Client,
    config: &AppConfig,
    id: Uuid,
) -> Result<(), WebBookingError> {
    let key = PendingBookingService::record_key(id);

    let payload: Option<String> = conn.get(&key).await?;
    let Some(payload) = payload else {
        debug!("Pending booking {} expired before processing", id);
        return Ok(());
    };

    let mut booking: PendingWebBooking = match serde_json::from_str(&payload) {
        Ok(booking) => booking,
        Err(e) => {
            warn!("Dropping undecodable pending booking {}: {}", id, e);
            let _: () = conn.del(&key).await?;
            return Ok(());
        }
    };

    if booking.status != PendingStatus::Pending {
        return Ok(());
    }

    let ttl: i64 = conn.ttl(&key).await?;
    let remaining = if ttl > 0 {
        ttl as u64
    } else {
        config.pending_booking_ttl_seconds
    };

    booking.status = PendingStatus::Processing;
    let _: () = conn
        .set_ex(&key, serde_json::to_string(&booking)?, remaining)
        .await?;

    match submit_booking(client, config, &booking).await {
        Ok(booking_id) => {
            booking.status = PendingStatus::Confirmed;
            booking.booking_id = booking_id;
            booking.resolved_at = Some(Utc::now());
            info!(
                "Pending booking {} confirmed as booking {:?}",
                id, booking_id
            );
            release_reservation(conn, &booking).await;
        }
        Err(WebBookingError::Downstream(reason)) => {
            booking.status = PendingStatus::Failed;
            booking.error = Some(reason.clone());
            booking.resolved_at = Some(Utc::now());
            warn!("Pending booking {} rejected downstream: {}", id, reason);
        }
        Err(WebBookingError::Transport(reason)) => {
            booking.status = PendingStatus::Failed;
            booking.error = Some(reason.clone());
            booking.resolved_at = Some(Utc::now());
            error!("Pending booking {} transport failure: {}", id, reason);
        }
        Err(e) => return Err(e),
    }

    let _: () = conn
        .set_ex(&key, serde_json::to_string(&booking)?, remaining)
        .await?;
    Ok(())
}

/// POST the trusted booking-creation endpoint. Returns the created
/// booking id on success; partitions failures into downstream-rejected vs
/// transport.
async fn submit_booking(
    client: &reqwest::Client,
    config: &AppConfig,
    booking: &PendingWebBooking,
) -> Result<Option<i64>, WebBookingError> {
    let url = format!("{}/internal/bookings/from-web", config.internal_api_url);
    let body = json!({
        "location_id": booking.selection.location_id,
        "service_id": booking.selection.service_id,
        "specialist_id": booking.selection.specialist_id,
        "date": booking.selection.date,
        "time": booking.selection.time,
        "phone": booking.phone,
        "name": booking.name,
    });

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| WebBookingError::Transport(format!("Network error: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        let result: Value = response
            .json()
            .await
            .map_err(|e| WebBookingError::Transport(format!("Invalid response body: {}", e)))?;
        return Ok(result.get("booking_id").and_then(Value::as_i64));
    }

    let detail = match response.text().await {
        Ok(text) => serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("detail"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| text.chars().take(200).collect()),
        Err(_) => "No response body".to_string(),
    };
    Err(WebBookingError::Downstream(format!(
        "{}: {}",
        status, detail
    )))
}

/// The reservation is redundant once the real booking exists. Failure to
/// delete it is harmless: it self-expires.
async fn release_reservation(conn: &mut Connection, booking: &PendingWebBooking) {
    let slot_key = ReservationService::slot_key(&booking.selection);
    let ref_key = ReservationService::ref_key(booking.reservation_id);
    if let Err(e) = conn.del::<_, ()>(vec![slot_key, ref_key]).await {
        warn!(
            "Failed to delete reservation {} after confirmation: {}",
            booking.reservation_id, e
        );
    }
}
