use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A single location sample for a user
///
/// Samples are appended to a user's history in chronological order and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedLocation {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub location: Location,
    #[serde(rename = "timeVisited", with = "chrono::serde::ts_milliseconds")]
    pub time_visited: DateTime<Utc>,
}

impl VisitedLocation {
    pub fn new(user_id: Uuid, location: Location, time_visited: DateTime<Utc>) -> Self {
        Self {
            user_id,
            location,
            time_visited,
        }
    }
}

/// Point of interest from the attraction catalog
///
/// Identity is the `attraction_id`; the name is for display and lookup only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    #[serde(rename = "attractionId")]
    pub attraction_id: Uuid,
    #[serde(rename = "attractionName")]
    pub attraction_name: String,
    pub city: String,
    pub state: String,
    #[serde(flatten)]
    pub location: Location,
}

impl Attraction {
    pub fn new(name: &str, city: &str, state: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            attraction_id: Uuid::new_v4(),
            attraction_name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            location: Location::new(latitude, longitude),
        }
    }
}

/// Points credited to a user for visiting an attraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReward {
    #[serde(rename = "visitedLocation")]
    pub visited_location: VisitedLocation,
    pub attraction: Attraction,
    #[serde(rename = "rewardPoints")]
    pub reward_points: i32,
}

impl UserReward {
    pub fn new(visited_location: VisitedLocation, attraction: Attraction, reward_points: i32) -> Self {
        Self {
            visited_location,
            attraction,
            reward_points,
        }
    }
}

/// Trip preferences; always replaced wholesale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default = "default_attraction_proximity")]
    pub attraction_proximity: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub lower_price_point: u32,
    #[serde(default = "default_high_price_point")]
    pub high_price_point: u32,
    #[serde(default = "default_one")]
    pub trip_duration: u32,
    #[serde(default = "default_one")]
    pub ticket_quantity: u32,
    #[serde(default = "default_one")]
    pub number_of_adults: u32,
    #[serde(default)]
    pub number_of_children: u32,
}

fn default_attraction_proximity() -> u32 { u32::MAX }
fn default_currency() -> String { "USD".to_string() }
fn default_high_price_point() -> u32 { u32::MAX }
fn default_one() -> u32 { 1 }

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            attraction_proximity: default_attraction_proximity(),
            currency: default_currency(),
            lower_price_point: 0,
            high_price_point: default_high_price_point(),
            trip_duration: default_one(),
            ticket_quantity: default_one(),
            number_of_adults: default_one(),
            number_of_children: 0,
        }
    }
}

/// Trip offer returned by the pricing collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub price: f64,
    #[serde(rename = "tripId")]
    pub trip_id: Uuid,
}

/// Parameters sent to the trip pricer
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub attraction_id: Uuid,
    pub user_id: Uuid,
    pub adults: u32,
    pub children: u32,
    pub nights: u32,
    pub reward_points: i64,
}
