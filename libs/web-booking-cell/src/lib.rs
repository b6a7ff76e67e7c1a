pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::WebBookingError;
pub use handlers::WebBookingState;
pub use models::*;
pub use router::create_web_booking_router;
pub use services::*;
