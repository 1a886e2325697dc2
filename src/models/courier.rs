//! Courier entity.

use super::ids::{CourierId, DepotId};
use serde::{Deserialize, Serialize};

/// A vehicle anchored to one depot, with item, weight, and distance limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub id: CourierId,
    pub name: String,
    pub phone: Option<String>,
    pub depot_id: DepotId,
    pub max_items: u32,
    pub max_weight_kg: f64,
    pub max_route_km: f64,
}

impl Courier {
    /// Creates a courier, returning `None` if any limit is out of range
    /// (§3: `max_items ∈ [1,100]`, `max_weight_kg > 0`, `max_route_km > 0`).
    pub fn new(
        id: CourierId,
        name: impl Into<String>,
        depot_id: DepotId,
        max_items: u32,
        max_weight_kg: f64,
        max_route_km: f64,
    ) -> Option<Self> {
        if !(1..=100).contains(&max_items) {
            return None;
        }
        if !(max_weight_kg > 0.0 && max_weight_kg.is_finite()) {
            return None;
        }
        if !(max_route_km > 0.0 && max_route_km.is_finite()) {
            return None;
        }
        Some(Self {
            id,
            name: name.into(),
            phone: None,
            depot_id,
            max_items,
            max_weight_kg,
            max_route_km,
        })
    }

    /// Builder-style setter for an optional phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn fits(&self, items: u32, weight_kg: f64) -> bool {
        items <= self.max_items && weight_kg <= self.max_weight_kg
    }
}
