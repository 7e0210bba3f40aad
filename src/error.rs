use thiserror::Error;

use crate::core::pool::PoolError;
use crate::services::ProviderError;

/// Errors surfaced to callers of the TourGuide operations
#[derive(Debug, Error)]
pub enum TourGuideError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Attraction not found: {0}")]
    AttractionNotFound(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TourGuideError>;
