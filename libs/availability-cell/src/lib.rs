pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use config::BookingConfig;
pub use error::AvailabilityError;
pub use handlers::AvailabilityState;
pub use models::*;
pub use router::create_availability_router;
pub use services::*;
