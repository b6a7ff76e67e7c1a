use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use deadpool_redis::Pool;
use serde_json::{json, Value};
use tracing::info;

use shared_database::PlatformDbClient;
use shared_models::AppError;

use crate::config::BookingConfig;
use crate::models::{
    CalendarQuery, CalendarResponse, DayQuery, GridQuery, GridResponse, InvalidateRequest,
    GRID_SCHEMA_VERSION,
};
use crate::services::invalidator::{dates_in_range, CacheInvalidator};
use crate::services::{AvailabilityService, GridService};

#[derive(Clone)]
pub struct AvailabilityState {
    pub db: Arc<PlatformDbClient>,
    pub redis: Pool,
    pub booking: BookingConfig,
}

/// GET /slots/calendar — per-day open/closed status over a date range.
/// The range is clamped to [today, today + horizon_days] and defaults to
/// the full horizon when bounds are omitted.
#[axum::debug_handler]
pub async fn get_slots_calendar(
    State(state): State<AvailabilityState>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();
    let horizon_end = today + Duration::days(state.booking.horizon_days as i64);

    let start_date = params.start_date.unwrap_or(today).clamp(today, horizon_end);
    let end_date = params
        .end_date
        .unwrap_or(horizon_end)
        .clamp(start_date, horizon_end);

    let dates = dates_in_range(start_date, end_date);

    let grid = GridService::new(state.db.clone(), state.redis.clone(), state.booking);
    let days = grid.calendar(params.location_id, &dates, now).await?;

    Ok(Json(CalendarResponse {
        location_id: params.location_id,
        start_date,
        end_date,
        days,
        horizon_days: state.booking.horizon_days,
        min_advance_hours: state.booking.min_advance_hours,
        slot_step_minutes: state.booking.slot_step_minutes,
    }))
}

/// GET /slots/day — Level-2 availability: bookable start times for a
/// specific service on a specific day, with qualifying specialists.
#[axum::debug_handler]
pub async fn get_service_day(
    State(state): State<AvailabilityState>,
    Query(params): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let now = Utc::now();
    let service =
        AvailabilityService::new(state.db.clone(), state.redis.clone(), state.booking);

    let availability = service
        .resolve(params.location_id, params.service_id, params.date, now)
        .await?;

    Ok(Json(json!({
        "success": true,
        "availability": availability,
    })))
}

/// GET /slots/grid — raw cached Level-1 grid contents, for debugging
/// cache state. `force_recalc=true` bypasses the cache.
#[axum::debug_handler]
pub async fn get_slots_grid(
    State(state): State<AvailabilityState>,
    Query(params): Query<GridQuery>,
) -> Result<Json<GridResponse>, AppError> {
    let now = Utc::now();
    let grid = GridService::new(state.db.clone(), state.redis.clone(), state.booking);

    let (slots, cached) = grid
        .raw_grid(params.location_id, params.date, params.force_recalc, now)
        .await?;

    // Counted from the store; falls back to the in-hand view if the
    // cache write was discarded.
    let live_slots = match grid.store().count_live(params.location_id, params.date, now).await {
        Ok(Some(count)) => count,
        _ => slots.iter().filter(|s| s.expire_at > now.timestamp()).count() as u64,
    };

    Ok(Json(GridResponse {
        location_id: params.location_id,
        date: params.date,
        slots,
        live_slots,
        cached,
        schema_version: GRID_SCHEMA_VERSION,
        slots_per_day: state.booking.slots_per_day(),
    }))
}

/// POST /slots/invalidate — drop cached grids for a location, either for
/// specific dates or wholesale.
#[axum::debug_handler]
pub async fn invalidate_slots(
    State(state): State<AvailabilityState>,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<Value>, AppError> {
    let invalidator = CacheInvalidator::new(state.redis.clone(), state.booking);
    let removed = if request.dates.is_some() {
        invalidator
            .invalidate(request.location_id, request.dates.as_deref())
            .await?
    } else if let (Some(start), Some(end)) = (request.date_start, request.date_end) {
        invalidator
            .invalidate_range(request.location_id, start, end)
            .await?
    } else {
        invalidator.invalidate(request.location_id, None).await?
    };

    info!(
        "Invalidation request for location {} removed {} cached grids",
        request.location_id, removed
    );

    Ok(Json(json!({
        "success": true,
        "location_id": request.location_id,
        "invalidated": removed,
    })))
}
