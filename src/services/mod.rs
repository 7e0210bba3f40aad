// Service exports
pub mod catalog;
pub mod gps;
pub mod providers;
pub mod reward_central;
pub mod simulated;
pub mod user_store;

pub use catalog::AttractionCatalog;
pub use gps::GpsUtilClient;
pub use providers::{LocationProvider, RewardScoreProvider, TripPricer, ProviderError};
pub use reward_central::RewardCentralClient;
pub use simulated::{SimulatedGps, SimulatedRewardCentral, SimulatedTripPricer};
pub use user_store::UserStore;
