use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::Settings;
use crate::core::pool::WorkerPools;
use crate::core::proximity::ProximityMatcher;
use crate::core::rewards::RewardsEngine;
use crate::core::tracker::LocationTracker;
use crate::error::{Result, TourGuideError};
use crate::models::{
    Attraction, Location, NearbyAttraction, NearbyAttractions, Provider, TripRequest, User,
    UserPreferences, UserReward, VisitedLocation,
};
use crate::services::{AttractionCatalog, LocationProvider, RewardScoreProvider, TripPricer, UserStore};

/// External collaborators wired into a [`TourGuide`]
pub struct Collaborators {
    pub locations: Arc<dyn LocationProvider>,
    pub scores: Arc<dyn RewardScoreProvider>,
    pub trip_pricer: Arc<dyn TripPricer>,
}

/// Entry point for location, reward and attraction queries
///
/// Owns the process-wide worker pools, the attraction catalog, the rewards
/// engine and the tracker. Call [`start`](TourGuide::start) after
/// construction and [`shutdown`](TourGuide::shutdown) before the process
/// exits.
pub struct TourGuide {
    store: Arc<UserStore>,
    catalog: Arc<AttractionCatalog>,
    rewards: Arc<RewardsEngine>,
    tracker: Arc<LocationTracker>,
    trip_pricer: Arc<dyn TripPricer>,
    trip_pricer_api_key: String,
    nearby_limit: usize,
    tracking_enabled: bool,
}

impl TourGuide {
    pub fn new(settings: &Settings, store: Arc<UserStore>, collaborators: Collaborators) -> Self {
        let call_timeout = settings.providers.call_timeout();

        let catalog = Arc::new(AttractionCatalog::new(
            Arc::clone(&collaborators.locations),
            call_timeout,
        ));

        let pools = Arc::new(WorkerPools::new(
            settings.pools.proximity_workers,
            settings.pools.scoring_workers,
        ));

        let matcher = ProximityMatcher::new(
            settings.proximity.buffer_miles,
            settings.proximity.attraction_range_miles,
        );

        let rewards = Arc::new(RewardsEngine::new(
            Arc::clone(&catalog),
            collaborators.scores,
            matcher,
            pools,
            call_timeout,
        ));

        let tracker = Arc::new(LocationTracker::new(
            collaborators.locations,
            Arc::clone(&rewards),
            Arc::clone(&store),
            settings.tracker.poll_interval(),
            call_timeout,
            settings.pools.tracking_concurrency,
        ));

        Self {
            store,
            catalog,
            rewards,
            tracker,
            trip_pricer: collaborators.trip_pricer,
            trip_pricer_api_key: settings.internal.trip_pricer_api_key.clone(),
            nearby_limit: settings.proximity.nearby_limit,
            tracking_enabled: settings.tracker.enabled,
        }
    }

    /// Begin periodic tracking if enabled in the settings
    pub fn start(&self) {
        if self.tracking_enabled {
            self.tracker.start();
        } else {
            info!("Periodic tracking disabled");
        }
    }

    /// Stop periodic tracking and close the worker pools
    ///
    /// Work already holding a pool permit completes on its own; anything
    /// still waiting for one fails with [`PoolError::Closed`].
    ///
    /// [`PoolError::Closed`]: crate::core::pool::PoolError::Closed
    pub async fn shutdown(&self) {
        self.tracker.stop().await;
        self.rewards.pools().close();
        info!("Worker pools closed");
    }

    pub fn user_store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub fn tracker(&self) -> &Arc<LocationTracker> {
        &self.tracker
    }

    pub fn rewards(&self) -> &Arc<RewardsEngine> {
        &self.rewards
    }

    pub fn add_user(&self, user: User) -> Arc<User> {
        info!(user = %user.name(), "Add user");
        self.store.add_user(user)
    }

    pub fn get_user(&self, user_name: &str) -> Result<Arc<User>> {
        self.store.get_user(user_name)
    }

    pub fn get_all_users(&self) -> Vec<Arc<User>> {
        self.store.all_users()
    }

    /// Last known location, fetching one only if the user has no history
    pub async fn get_user_location(&self, user_name: &str) -> Result<VisitedLocation> {
        info!(user = %user_name, "Get user location");
        let user = self.store.get_user(user_name)?;
        Ok(self.tracker.refresh(&user).await?)
    }

    pub fn get_user_rewards(&self, user_name: &str) -> Result<Vec<UserReward>> {
        info!(user = %user_name, "Get user rewards");
        let user = self.store.get_user(user_name)?;
        Ok(self.rewards.get_user_rewards(&user))
    }

    /// The closest attractions to a visited location with a reward preview
    ///
    /// Preview points come straight from the scoring provider and are not
    /// stored. A failed preview is reported as `None` for that attraction.
    pub async fn nearby_attractions(&self, visited: &VisitedLocation) -> Result<NearbyAttractions> {
        info!(
            latitude = visited.location.latitude,
            longitude = visited.location.longitude,
            "Get nearby attractions"
        );
        let attractions = self.catalog.attractions().await?;
        let nearest = self
            .rewards
            .matcher()
            .nearest_k(&visited.location, &attractions, self.nearby_limit);

        let previews = join_all(nearest.iter().map(|ranked| {
            self.rewards
                .get_reward_points(ranked.attraction, visited.user_id)
        }))
        .await;

        let attractions = nearest
            .iter()
            .zip(previews)
            .map(|(ranked, points)| NearbyAttraction {
                attraction_name: ranked.attraction.attraction_name.clone(),
                attraction_location: ranked.attraction.location,
                distance_miles: ranked.distance_miles,
                reward_points: match points {
                    Ok(points) => Some(points),
                    Err(e) => {
                        tracing::warn!(
                            attraction = %ranked.attraction.attraction_name,
                            "Reward preview unavailable: {}",
                            e
                        );
                        None
                    }
                },
            })
            .collect();

        Ok(NearbyAttractions {
            user_location: visited.location,
            attractions,
        })
    }

    /// Most recent location of every user with at least one sample
    pub fn get_all_current_locations(&self) -> HashMap<Uuid, Location> {
        info!("Get all current locations");
        self.store
            .all_users()
            .iter()
            .filter_map(|user| {
                user.last_visited_location()
                    .map(|visited| (user.id(), visited.location))
            })
            .collect()
    }

    /// Case-insensitive lookup over the whole catalog
    pub async fn get_attraction(&self, attraction_name: &str) -> Result<Attraction> {
        info!(attraction = %attraction_name, "Get attraction");
        let wanted = attraction_name.to_lowercase();
        let attractions = self.catalog.attractions().await?;

        attractions
            .iter()
            .find(|attraction| attraction.attraction_name.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| TourGuideError::AttractionNotFound(attraction_name.to_string()))
    }

    /// Replace the user's preferences wholesale
    pub fn update_preferences(&self, user_name: &str, preferences: UserPreferences) -> Result<UserPreferences> {
        info!(user = %user_name, "Update user preferences");
        let user = self.store.get_user(user_name)?;
        user.set_preferences(preferences);
        Ok(user.preferences())
    }

    /// Quotes for a trip to `attraction`, priced with the user's reward points
    ///
    /// The quotes are also kept as the user's current trip deals.
    pub async fn get_trip_deals(&self, user_name: &str, attraction: &Attraction) -> Result<Vec<Provider>> {
        info!(user = %user_name, attraction = %attraction.attraction_name, "Get trip deals");
        let user = self.store.get_user(user_name)?;
        let preferences = user.preferences();

        let request = TripRequest {
            attraction_id: attraction.attraction_id,
            user_id: user.id(),
            adults: preferences.number_of_adults,
            children: preferences.number_of_children,
            nights: preferences.trip_duration,
            reward_points: user.total_reward_points(),
        };

        let providers = self
            .trip_pricer
            .get_price(&self.trip_pricer_api_key, &request)
            .await?;

        user.set_trip_deals(providers.clone());
        Ok(providers)
    }
}
