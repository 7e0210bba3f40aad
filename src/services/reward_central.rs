use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use crate::services::providers::{ProviderError, RewardScoreProvider};

/// HTTP client for the RewardCentral service
///
/// `GET /getRewards?attractionId=<uuid>&userId=<uuid>` returns the points as a
/// bare integer.
pub struct RewardCentralClient {
    base_url: String,
    client: Client,
}

impl RewardCentralClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl RewardScoreProvider for RewardCentralClient {
    async fn get_points(&self, attraction_id: Uuid, user_id: Uuid) -> Result<i32, ProviderError> {
        let url = format!("{}/getRewards", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[
                ("attractionId", attraction_id.to_string()),
                ("userId", user_id.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to fetch reward points: {}",
                response.status()
            )));
        }

        response
            .json::<i32>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse reward points: {}", e)))
    }
}
