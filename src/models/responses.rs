use serde::{Deserialize, Serialize};

use crate::models::Location;

/// One entry of a nearby-attractions answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAttraction {
    #[serde(rename = "attractionName")]
    pub attraction_name: String,
    #[serde(rename = "attractionLocation")]
    pub attraction_location: Location,
    #[serde(rename = "distanceMiles")]
    pub distance_miles: f64,
    /// Preview from the scoring provider; `None` when the provider failed
    #[serde(rename = "rewardPoints")]
    pub reward_points: Option<i32>,
}

/// Closest attractions to a user location, nearest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAttractions {
    #[serde(rename = "userLocation")]
    pub user_location: Location,
    pub attractions: Vec<NearbyAttraction>,
}
