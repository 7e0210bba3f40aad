//! TourGuide - concurrent location tracking and attraction rewards
//!
//! This library tracks the positions of a large population of users and
//! credits each of them, exactly once per attraction, with reward points for
//! the attractions they have visited.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{TourGuide, Collaborators, ProximityMatcher, RewardsEngine, LocationTracker, distance_miles};
pub use error::{Result, TourGuideError};
pub use models::{Location, VisitedLocation, Attraction, UserReward, UserPreferences, User, NearbyAttractions};
