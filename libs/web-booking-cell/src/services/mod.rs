pub mod processor;
pub mod reservation;

pub use processor::{run_pending_booking_processor, PendingBookingService};
pub use reservation::ReservationService;
