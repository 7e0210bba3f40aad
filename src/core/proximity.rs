use crate::core::distance::distance_miles;
use crate::models::{Attraction, Location};

/// Default radius for a visit to count towards a reward
pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;

/// Default radius for the general "is near" predicate
pub const DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES: f64 = 200.0;

/// An attraction paired with its distance from a query point
#[derive(Debug, Clone, Copy)]
pub struct RankedAttraction<'a> {
    pub attraction: &'a Attraction,
    pub distance_miles: f64,
}

/// Distance predicates and nearest-attraction selection
///
/// Holds two independent thresholds: the proximity buffer decides reward
/// eligibility, the attraction proximity range only backs [`is_near`].
///
/// [`is_near`]: ProximityMatcher::is_near
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMatcher {
    proximity_buffer_miles: f64,
    attraction_proximity_range_miles: f64,
}

impl ProximityMatcher {
    pub fn new(proximity_buffer_miles: f64, attraction_proximity_range_miles: f64) -> Self {
        Self {
            proximity_buffer_miles,
            attraction_proximity_range_miles,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_PROXIMITY_BUFFER_MILES,
            DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES,
        )
    }

    pub fn proximity_buffer(&self) -> f64 {
        self.proximity_buffer_miles
    }

    pub fn set_proximity_buffer(&mut self, miles: f64) {
        self.proximity_buffer_miles = miles;
    }

    pub fn reset_proximity_buffer(&mut self) {
        self.proximity_buffer_miles = DEFAULT_PROXIMITY_BUFFER_MILES;
    }

    pub fn attraction_proximity_range(&self) -> f64 {
        self.attraction_proximity_range_miles
    }

    /// Whether a visit at `location` is eligible for a reward at `attraction`
    #[inline]
    pub fn is_within_proximity_buffer(&self, attraction: &Attraction, location: &Location) -> bool {
        is_within(attraction, location, self.proximity_buffer_miles)
    }

    /// Loose "is near" predicate; never used for reward eligibility
    #[inline]
    pub fn is_near(&self, attraction: &Attraction, location: &Location) -> bool {
        is_within(attraction, location, self.attraction_proximity_range_miles)
    }

    /// The `k` attractions closest to `location`, nearest first
    ///
    /// The sort is stable, so equal distances keep catalog order. Returns
    /// every attraction when the catalog holds fewer than `k`.
    pub fn nearest_k<'a>(
        &self,
        location: &Location,
        attractions: &'a [Attraction],
        k: usize,
    ) -> Vec<RankedAttraction<'a>> {
        let mut ranked: Vec<RankedAttraction<'a>> = attractions
            .iter()
            .map(|attraction| RankedAttraction {
                attraction,
                distance_miles: distance_miles(&attraction.location, location),
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        ranked.truncate(k);
        ranked
    }
}

impl Default for ProximityMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether `location` lies within `radius_miles` of `attraction`
#[inline]
pub fn is_within(attraction: &Attraction, location: &Location, radius_miles: f64) -> bool {
    distance_miles(&attraction.location, location) <= radius_miles
}
