//! Great-circle distance for geofence admission.

/// Mean earth radius in meters (spherical approximation).
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two (latitude, longitude) pairs
/// given in degrees.
///
/// Pure and deterministic. Callers are responsible for rejecting
/// out-of-range or NaN coordinates upstream; admission is decided as
/// `distance <= radius`.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_distance_m(48.8584, 2.2945, 48.8584, 2.2945), 0.0);
    }

    #[test]
    fn eiffel_to_louvre_is_about_three_kilometers() {
        // Eiffel Tower to the Louvre, a well-surveyed ~3.2 km.
        let d = haversine_distance_m(48.8584, 2.2945, 48.8606, 2.3376);
        assert!(d > 3000.0, "distance {} too short", d);
        assert!(d < 3400.0, "distance {} too long", d);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_distance_m(48.8584, 2.2945, 40.7128, -74.0060);
        let b = haversine_distance_m(40.7128, -74.0060, 48.8584, 2.2945);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn short_hops_stay_inside_small_radii() {
        // ~111 m per 0.001 degree of latitude.
        let d = haversine_distance_m(48.8584, 2.2945, 48.8593, 2.2945);
        assert!(d > 90.0 && d < 120.0, "unexpected distance {}", d);
    }
}
