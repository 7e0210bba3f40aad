use crate::models::Location;

/// Statute miles in one nautical mile
pub const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.15077945;

/// Great-circle distance between two points in statute miles
///
/// Uses the spherical law of cosines: the central angle is converted to
/// nautical miles (one minute of arc each) and then to statute miles.
///
/// # Arguments
/// * `a` - First point in degrees
/// * `b` - Second point in degrees
///
/// # Returns
/// Distance in statute miles, `0.0` for identical points
#[inline]
pub fn distance_miles(a: &Location, b: &Location) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    // Rounding can push the cosine just outside [-1, 1]
    let cos_angle = (lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos())
        .clamp(-1.0, 1.0);
    let angle = cos_angle.acos();

    let nautical_miles = 60.0 * angle.to_degrees();
    STATUTE_MILES_PER_NAUTICAL_MILE * nautical_miles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let disneyland = Location::new(33.817595, -117.922008);
        assert_eq!(distance_miles(&disneyland, &disneyland), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Location::new(33.817595, -117.922008);
        let b = Location::new(43.582767, -110.821999);

        assert_eq!(distance_miles(&a, &b), distance_miles(&b, &a));
    }

    #[test]
    fn test_distance_los_angeles_to_new_york() {
        // Roughly 2450 statute miles
        let los_angeles = Location::new(34.0522, -118.2437);
        let new_york = Location::new(40.7128, -74.0060);

        let distance = distance_miles(&los_angeles, &new_york);
        assert!((distance - 2450.0).abs() < 30.0, "Distance should be ~2450mi, got {}", distance);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // 60 nautical miles along a meridian
        let a = Location::new(0.0, 0.0);
        let b = Location::new(1.0, 0.0);

        let distance = distance_miles(&a, &b);
        assert!((distance - 60.0 * STATUTE_MILES_PER_NAUTICAL_MILE).abs() < 1e-6);
    }
}
