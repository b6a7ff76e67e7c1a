pub mod calculator;
pub mod grid;
pub mod grid_cache;
pub mod invalidator;
pub mod resolver;

pub use calculator::{calculate_day_grid, effective_intervals};
pub use grid::GridService;
pub use grid_cache::GridCacheStore;
pub use invalidator::{dates_in_range, CacheInvalidator};
pub use resolver::AvailabilityService;
