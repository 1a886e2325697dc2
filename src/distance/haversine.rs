//! Haversine great-circle distance (§2 "Geodesic primitives").

use crate::models::Location;

/// Mean Earth radius in kilometers, per §4.1.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two locations, in kilometers.
///
/// # Examples
///
/// ```
/// use mdvrp_core::models::Location;
/// use mdvrp_core::distance::haversine_km;
///
/// let a = Location::new(0.0, 0.0, None).unwrap();
/// let b = Location::new(0.0, 0.0, None).unwrap();
/// assert_eq!(haversine_km(&a, &b), 0.0);
/// ```
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlng = (dlng / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().asin();
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> Location {
        Location::new(lat, lng, None).unwrap()
    }

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(&loc(55.75, 37.62), &loc(55.75, 37.62)), 0.0);
    }

    #[test]
    fn is_symmetric() {
        let a = loc(10.0, 10.0);
        let b = loc(20.0, 30.0);
        assert!((haversine_km(&a, &b) - haversine_km(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let a = loc(0.0, 0.0);
        let b = loc(1.0, 0.0);
        let d = haversine_km(&a, &b);
        assert!((d - 111.19).abs() < 0.5, "distance was {d}");
    }

    #[test]
    fn equator_quarter_circle_is_about_10000_km() {
        // (0,0) to (0,90) is a quarter of the equatorial great circle.
        let a = loc(0.0, 0.0);
        let b = loc(0.0, 90.0);
        let d = haversine_km(&a, &b);
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1.0, "distance was {d}");
    }

    #[test]
    fn never_negative() {
        let a = loc(-45.0, 170.0);
        let b = loc(45.0, -170.0);
        assert!(haversine_km(&a, &b) >= 0.0);
    }
}
