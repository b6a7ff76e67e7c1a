use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub platform_api_url: String,
    pub platform_api_key: String,
    pub internal_api_url: String,
    pub redis_url: Option<String>,

    // Booking tunables (validated into a BookingConfig by the availability cell)
    pub horizon_days: u32,
    pub min_advance_hours: i64,
    pub slot_step_minutes: u32,
    pub cache_ttl_seconds: u64,

    // Public web booking flow
    pub reservation_ttl_seconds: u64,
    pub pending_booking_ttl_seconds: u64,
    pub processor_poll_interval_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            platform_api_url: env::var("PLATFORM_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PLATFORM_API_URL not set, using empty value");
                    String::new()
                }),
            platform_api_key: env::var("PLATFORM_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("PLATFORM_API_KEY not set, using empty value");
                    String::new()
                }),
            internal_api_url: env::var("INTERNAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("INTERNAL_API_URL not set, using default");
                    "http://127.0.0.1:8000".to_string()
                }),
            redis_url: env::var("REDIS_URL").ok(),
            horizon_days: env_number("BOOKING_HORIZON_DAYS", 60),
            min_advance_hours: env_number("BOOKING_MIN_ADVANCE_HOURS", 12),
            slot_step_minutes: env_number("BOOKING_SLOT_STEP_MINUTES", 30),
            cache_ttl_seconds: env_number("BOOKING_CACHE_TTL_SECONDS", 86400),
            reservation_ttl_seconds: env_number("RESERVATION_TTL_SECONDS", 300),
            pending_booking_ttl_seconds: env_number("PENDING_BOOKING_TTL_SECONDS", 3600),
            processor_poll_interval_seconds: env_number("PROCESSOR_POLL_INTERVAL_SECONDS", 1),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.platform_api_url.is_empty() && self.redis_url.is_some()
    }
}

fn env_number<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid number, using default", name);
            default
        }),
        Err(_) => default,
    }
}
