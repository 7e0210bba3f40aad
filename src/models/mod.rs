// Model exports
pub mod domain;
pub mod responses;
pub mod user;

pub use domain::{Location, VisitedLocation, Attraction, UserReward, UserPreferences, Provider, TripRequest};
pub use responses::{NearbyAttraction, NearbyAttractions};
pub use user::User;
