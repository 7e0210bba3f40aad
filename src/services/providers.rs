use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Attraction, Provider, TripRequest, VisitedLocation};

/// Errors raised by the external collaborators
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of user positions and of the attraction catalog (GpsUtil)
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn get_user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError>;

    async fn get_attractions(&self) -> Result<Vec<Attraction>, ProviderError>;
}

/// Source of reward points for a visit (RewardCentral)
#[async_trait]
pub trait RewardScoreProvider: Send + Sync {
    async fn get_points(&self, attraction_id: Uuid, user_id: Uuid) -> Result<i32, ProviderError>;
}

/// Turns accumulated reward points into provider quotes
#[async_trait]
pub trait TripPricer: Send + Sync {
    async fn get_price(&self, api_key: &str, request: &TripRequest) -> Result<Vec<Provider>, ProviderError>;
}

/// Run a provider call with an upper bound on its duration
pub async fn with_timeout<T, F>(
    operation: &'static str,
    after: Duration,
    call: F,
) -> Result<T, ProviderError>
where
    F: std::future::Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout { operation, after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let result = with_timeout("ok", Duration::from_secs(1), async { Ok::<_, ProviderError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_reports_slow_call() {
        let result = with_timeout("getRewards", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ProviderError>(7)
        })
        .await;

        match result {
            Err(ProviderError::Timeout { operation, .. }) => assert_eq!(operation, "getRewards"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
