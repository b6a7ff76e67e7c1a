use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid booking configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Cache pool error: {0}")]
    CachePool(String),

    #[error("Service not found: {0}")]
    ServiceNotFound(i64),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ServiceNotFound(id) => {
                AppError::NotFound(format!("Service {} not found", id))
            }
            AvailabilityError::Database(msg) => AppError::Database(msg),
            AvailabilityError::Config(msg) => AppError::Internal(msg),
            AvailabilityError::Cache(e) => AppError::Internal(e.to_string()),
            AvailabilityError::CachePool(msg) => AppError::Internal(msg),
        }
    }
}
