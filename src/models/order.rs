//! Order entity and lifecycle status.

use super::ids::{CourierId, DepotId, OrderId};
use super::location::Location;
use serde::{Deserialize, Serialize};

/// Order lifecycle state. Only `Pending` orders enter optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

/// A customer order awaiting (or having received) a delivery assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub location: Location,
    pub items: u32,
    pub weight_kg: f64,
    pub status: OrderStatus,
    pub assigned_depot_id: Option<DepotId>,
    pub assigned_courier_id: Option<CourierId>,
}

impl Order {
    /// Creates a pending order, returning `None` if `items` or `weight_kg`
    /// are out of range (§3: `items ∈ [1,100]`, `weight_kg > 0`).
    pub fn new_pending(
        id: OrderId,
        customer_name: impl Into<String>,
        customer_phone: Option<String>,
        location: Location,
        items: u32,
        weight_kg: f64,
    ) -> Option<Self> {
        if !(1..=100).contains(&items) {
            return None;
        }
        if !(weight_kg > 0.0 && weight_kg.is_finite()) {
            return None;
        }
        Some(Self {
            id,
            customer_name: customer_name.into(),
            customer_phone,
            location,
            items,
            weight_kg,
            status: OrderStatus::Pending,
            assigned_depot_id: None,
            assigned_courier_id: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Whether this order's location is usable for routing (§4.1, §7
    /// "Unreachable order").
    pub fn has_usable_location(&self) -> bool {
        self.location.is_usable()
    }
}
