// Core algorithm exports
pub mod distance;
pub mod pool;
pub mod proximity;
pub mod rewards;
pub mod tour_guide;
pub mod tracker;

pub use distance::distance_miles;
pub use pool::{WorkerPools, PoolError};
pub use proximity::{ProximityMatcher, RankedAttraction, is_within};
pub use rewards::{RewardsEngine, RewardSummary};
pub use tour_guide::{TourGuide, Collaborators};
pub use tracker::LocationTracker;
