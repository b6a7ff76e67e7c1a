pub mod catalog;
pub mod error;
pub mod schedule;

pub use catalog::*;
pub use error::AppError;
pub use schedule::{TimeInterval, WeekSchedule};
