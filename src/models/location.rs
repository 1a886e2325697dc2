//! Geographic location.

use serde::{Deserialize, Serialize};

/// A point on Earth, as consumed from the persistence collaborator.
///
/// Equality is by value (lat/lng/address), but entities that *reference* a
/// location (depots, orders) are compared by id, never by comparing their
/// `Location`s — two depots at the same coordinates remain distinct depots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

impl Location {
    /// Creates a location, returning `None` if lat/lng are out of range or
    /// not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdvrp_core::models::Location;
    ///
    /// assert!(Location::new(55.75, 37.62, None).is_some());
    /// assert!(Location::new(91.0, 0.0, None).is_none());
    /// assert!(Location::new(f64::NAN, 0.0, None).is_none());
    /// ```
    pub fn new(lat: f64, lng: f64, address: Option<String>) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng, address })
    }

    /// Whether this location is usable as an optimization input.
    ///
    /// Per the matrix-provider contract, `(0, 0)` is treated as a missing
    /// sentinel rather than a real point (§4.1 "Failure semantics").
    pub fn is_usable(&self) -> bool {
        !(self.lat == 0.0 && self.lng == 0.0)
    }
}
