use std::sync::Arc;
use std::time::Duration;

use crate::models::Attraction;
use crate::services::providers::{with_timeout, LocationProvider, ProviderError};

const CATALOG_KEY: &str = "attractions";

/// Process-wide attraction catalog
///
/// The catalog is fetched from the location provider on first use and then
/// shared read-only. Concurrent first callers wait on a single load; a failed
/// load is not cached, so the next caller retries.
pub struct AttractionCatalog {
    provider: Arc<dyn LocationProvider>,
    cache: moka::future::Cache<&'static str, Arc<Vec<Attraction>>>,
    call_timeout: Duration,
}

impl AttractionCatalog {
    pub fn new(provider: Arc<dyn LocationProvider>, call_timeout: Duration) -> Self {
        let cache = moka::future::Cache::builder().initial_capacity(1).build();

        Self {
            provider,
            cache,
            call_timeout,
        }
    }

    /// The full catalog, loading it on first use
    pub async fn attractions(&self) -> Result<Arc<Vec<Attraction>>, ProviderError> {
        self.cache
            .try_get_with(CATALOG_KEY, async {
                let attractions = with_timeout(
                    "getAttractions",
                    self.call_timeout,
                    self.provider.get_attractions(),
                )
                .await?;

                tracing::info!(count = attractions.len(), "Attraction catalog loaded");
                Ok::<_, ProviderError>(Arc::new(attractions))
            })
            .await
            .map_err(|e| ProviderError::Unavailable(format!("attraction catalog: {}", e)))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.contains_key(&CATALOG_KEY)
    }
}
