use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Attraction, VisitedLocation};
use crate::services::providers::{LocationProvider, ProviderError};

/// HTTP client for the GpsUtil service
///
/// Endpoints:
/// - `GET /location?userId=<uuid>` returns the user's current position
/// - `GET /attractions` returns the attraction catalog
pub struct GpsUtilClient {
    base_url: String,
    client: Client,
}

impl GpsUtilClient {
    /// Create a new GpsUtil client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LocationProvider for GpsUtilClient {
    async fn get_user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
        let url = self.url("location");
        tracing::trace!("Fetching location from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to fetch location for {}: {}",
                user_id,
                response.status()
            )));
        }

        response
            .json::<VisitedLocation>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse location: {}", e)))
    }

    async fn get_attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
        let url = self.url("attractions");
        tracing::debug!("Fetching attractions from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to fetch attractions: {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Attraction>>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse attractions: {}", e)))
    }
}
