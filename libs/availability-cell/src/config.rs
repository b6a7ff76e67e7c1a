use chrono::NaiveTime;

use shared_config::AppConfig;

use crate::error::AvailabilityError;

/// Floor for cached-grid key expiry, and therefore for the configured TTL.
pub const MIN_CACHE_TTL_SECS: u64 = 60;

/// Validated booking tunables, constructed once and passed into every
/// component. No process-wide singleton: parallel tests can run with
/// different configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingConfig {
    pub horizon_days: u32,
    pub min_advance_hours: i64,
    pub slot_step_minutes: u32,
    pub cache_ttl_seconds: u64,
}

impl BookingConfig {
    pub fn new(
        horizon_days: u32,
        min_advance_hours: i64,
        slot_step_minutes: u32,
        cache_ttl_seconds: u64,
    ) -> Result<Self, AvailabilityError> {
        if !matches!(slot_step_minutes, 15 | 30 | 60) {
            return Err(AvailabilityError::Config(format!(
                "slot_step_minutes must be 15, 30 or 60, got {}",
                slot_step_minutes
            )));
        }
        if cache_ttl_seconds < MIN_CACHE_TTL_SECS {
            return Err(AvailabilityError::Config(format!(
                "cache_ttl_seconds must be at least {}, got {}",
                MIN_CACHE_TTL_SECS, cache_ttl_seconds
            )));
        }
        Ok(Self {
            horizon_days,
            min_advance_hours,
            slot_step_minutes,
            cache_ttl_seconds,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, AvailabilityError> {
        Self::new(
            config.horizon_days,
            config.min_advance_hours,
            config.slot_step_minutes,
            config.cache_ttl_seconds,
        )
    }

    /// 15 min -> 96 slots, 30 min -> 48, 60 min -> 24.
    pub fn slots_per_day(&self) -> usize {
        (24 * 60 / self.slot_step_minutes) as usize
    }

    pub fn time_to_slot(&self, time: NaiveTime) -> usize {
        use chrono::Timelike;
        ((time.hour() * 60 + time.minute()) / self.slot_step_minutes) as usize
    }

    pub fn format_slot_time(&self, slot: usize) -> String {
        let total_minutes = slot as u32 * self.slot_step_minutes;
        format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
    }

    /// Parse an `HH:MM` label into a slot index; rejects labels that are not
    /// aligned to the grid step.
    pub fn parse_slot_label(&self, label: &str) -> Option<usize> {
        use chrono::Timelike;
        let time = shared_models::schedule::parse_time_label(label)?;
        (time.minute() % self.slot_step_minutes == 0).then(|| self.time_to_slot(time))
    }

    /// Consecutive slots covered by `total_minutes` of booked time,
    /// rounded up to whole slots.
    pub fn slots_needed(&self, total_minutes: i64) -> usize {
        if total_minutes <= 0 {
            return 0;
        }
        let step = self.slot_step_minutes as i64;
        ((total_minutes + step - 1) / step) as usize
    }
}
