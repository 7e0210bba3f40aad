//! In-process stand-ins for the external collaborators
//!
//! Used when no provider URLs are configured and by the internal test mode,
//! which seeds the store with generated users.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Attraction, Location, Provider, TripRequest, User, VisitedLocation};
use crate::services::providers::{LocationProvider, ProviderError, RewardScoreProvider, TripPricer};

const MAX_LATITUDE: f64 = 85.05112878;
const MAX_LONGITUDE: f64 = 180.0;

/// Simulated GpsUtil
///
/// Returns a random position for every location request, or a fixed one when
/// configured. Counts location requests.
pub struct SimulatedGps {
    attractions: Vec<Attraction>,
    fixed_location: RwLock<Option<Location>>,
    latency: Duration,
    location_calls: AtomicUsize,
}

impl SimulatedGps {
    pub fn new() -> Self {
        Self::with_attractions(default_attractions())
    }

    pub fn with_attractions(attractions: Vec<Attraction>) -> Self {
        Self {
            attractions,
            fixed_location: RwLock::new(None),
            latency: Duration::ZERO,
            location_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Answer every location request with `location`
    pub fn set_fixed_location(&self, location: Option<Location>) {
        *self.fixed_location.write() = location;
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedGps {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for SimulatedGps {
    async fn get_user_location(&self, user_id: Uuid) -> Result<VisitedLocation, ProviderError> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let fixed = *self.fixed_location.read();
        let location = fixed.unwrap_or_else(random_location);
        Ok(VisitedLocation::new(user_id, location, Utc::now()))
    }

    async fn get_attractions(&self) -> Result<Vec<Attraction>, ProviderError> {
        Ok(self.attractions.clone())
    }
}

/// Simulated RewardCentral
///
/// Answers after a fixed latency with random points in 1..=1000, or a fixed
/// value when configured.
pub struct SimulatedRewardCentral {
    latency: Duration,
    fixed_points: Option<i32>,
    calls: AtomicUsize,
}

impl SimulatedRewardCentral {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fixed_points: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fixed_points(mut self, points: i32) -> Self {
        self.fixed_points = Some(points);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RewardScoreProvider for SimulatedRewardCentral {
    async fn get_points(&self, _attraction_id: Uuid, _user_id: Uuid) -> Result<i32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(self
            .fixed_points
            .unwrap_or_else(|| rand::thread_rng().gen_range(1..=1000)))
    }
}

/// Simulated trip pricer
///
/// Quotes five providers; more reward points lower the price.
#[derive(Debug, Default)]
pub struct SimulatedTripPricer;

const PROVIDER_NAMES: [&str; 10] = [
    "Holiday Travels",
    "Enterprize Ventures Limited",
    "Sunny Days",
    "FlyAway Trips",
    "United Partners Vacations",
    "Dream Trips",
    "Live Free",
    "Dancing Waves Cruselines and Partners",
    "AdventureCo",
    "Cure-Your-Blues",
];

#[async_trait]
impl TripPricer for SimulatedTripPricer {
    async fn get_price(&self, _api_key: &str, request: &TripRequest) -> Result<Vec<Provider>, ProviderError> {
        let mut rng = rand::thread_rng();
        let travellers = f64::from(request.adults) + f64::from(request.children) * 0.5;
        let nights = f64::from(request.nights.max(1));
        let discount = request.reward_points as f64 * 0.01;

        let providers = PROVIDER_NAMES
            .iter()
            .skip(rng.gen_range(0..PROVIDER_NAMES.len() - 5))
            .take(5)
            .map(|name| {
                let nightly: f64 = rng.gen_range(100.0..700.0);
                Provider {
                    name: (*name).to_string(),
                    price: (nightly * nights * travellers - discount).max(0.0),
                    trip_id: Uuid::new_v4(),
                }
            })
            .collect();

        Ok(providers)
    }
}

/// Generate `count` users named `internalUser{i}`, each with three random
/// visited locations from the last 30 days
pub fn internal_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| {
            let name = format!("internalUser{}", i);
            let user = User::new(Uuid::new_v4(), &name, "000", &format!("{}@tourGuide.com", name));
            generate_location_history(&user);
            user
        })
        .collect()
}

pub fn generate_location_history(user: &User) {
    let mut rng = rand::thread_rng();
    for _ in 0..3 {
        let days_ago = rng.gen_range(0..30);
        user.add_visited_location(VisitedLocation::new(
            user.id(),
            random_location(),
            Utc::now() - ChronoDuration::days(days_ago),
        ));
    }
}

fn random_location() -> Location {
    let mut rng = rand::thread_rng();
    Location::new(
        rng.gen_range(-MAX_LATITUDE..MAX_LATITUDE),
        rng.gen_range(-MAX_LONGITUDE..MAX_LONGITUDE),
    )
}

/// Built-in catalog of US attractions
pub fn default_attractions() -> Vec<Attraction> {
    vec![
        Attraction::new("Disneyland", "Anaheim", "CA", 33.817595, -117.922008),
        Attraction::new("Jackson Hole", "Jackson Hole", "WY", 43.582767, -110.821999),
        Attraction::new("Mojave National Preserve", "Kelso", "CA", 35.141689, -115.510399),
        Attraction::new("Joshua Tree National Park", "Joshua Tree National Park", "CA", 33.881866, -115.90065),
        Attraction::new("Buffalo National River", "St Joe", "AR", 35.985512, -92.757652),
        Attraction::new("Hot Springs National Park", "Hot Springs", "AR", 34.52153, -93.042267),
        Attraction::new("Kartchner Caverns State Park", "Benson", "AZ", 31.837551, -110.347382),
        Attraction::new("Legend Valley", "Thornville", "OH", 39.937778, -82.40667),
        Attraction::new("Flowers Bakery of London", "Flowers Bakery of London", "KY", 37.131527, -84.07486),
        Attraction::new("McKinley Tower", "Anchorage", "AK", 61.218887, -149.877502),
        Attraction::new("Flatiron Building", "New York City", "NY", 40.741112, -73.989723),
        Attraction::new("Fallingwater", "Mill Run", "PA", 39.906113, -79.468056),
        Attraction::new("Union Station", "Washington D.C.", "CA", 38.897095, -77.006332),
        Attraction::new("Roger Dean Stadium", "Jupiter", "FL", 26.890959, -80.116577),
        Attraction::new("Texas Memorial Stadium", "Austin", "TX", 30.283682, -97.732536),
        Attraction::new("Bryant-Denny Stadium", "Tuscaloosa", "AL", 33.208973, -87.550438),
        Attraction::new("Tiger Stadium", "Baton Rouge", "LA", 30.412035, -91.183815),
        Attraction::new("Neyland Stadium", "Knoxville", "TN", 35.955013, -83.925011),
        Attraction::new("Kyle Field", "College Station", "TX", 30.61025, -96.339844),
        Attraction::new("San Diego Zoo", "San Diego", "CA", 32.735317, -117.149048),
        Attraction::new("Zoo Tampa at Lowry Park", "Tampa", "FL", 28.012804, -82.469269),
        Attraction::new("Franklin Park Zoo", "Boston", "MA", 42.302601, -71.086731),
        Attraction::new("El Paso Zoo", "El Paso", "TX", 31.769125, -106.44487),
        Attraction::new("Kansas City Zoo", "Kansas City", "MO", 39.007504, -94.529625),
        Attraction::new("Bronx Zoo", "Bronx", "NY", 40.852905, -73.872971),
        Attraction::new("Cinderella Castle", "Orlando", "FL", 28.419411, -81.5812),
    ]
}
