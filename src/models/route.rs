//! Route and route-point records produced by the optimization engines.

use super::ids::{CourierId, DepotId, OrderId, RouteId};
use serde::{Deserialize, Serialize};

/// One stop on a route: the order delivered and its position in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub order_id: OrderId,
    pub sequence: u32,
    pub estimated_arrival: Option<String>,
}

impl RoutePoint {
    pub fn new(order_id: OrderId, sequence: u32) -> Self {
        Self {
            order_id,
            sequence,
            estimated_arrival: None,
        }
    }
}

/// One courier's ordered sequence of deliveries for one optimization call.
///
/// # Examples
///
/// ```
/// use mdvrp_core::models::{Route, RoutePoint, RouteId, CourierId, DepotId, OrderId};
///
/// let mut route = Route::new(RouteId::from("r1"), CourierId::from("c1"), DepotId::from("d1"));
/// route.points.push(RoutePoint::new(OrderId::from("o1"), 0));
/// assert!(!route.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub courier_id: CourierId,
    pub depot_id: DepotId,
    pub total_distance_km: f64,
    pub total_items: u32,
    pub total_weight_kg: f64,
    pub points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(id: RouteId, courier_id: CourierId, depot_id: DepotId) -> Self {
        Self {
            id,
            courier_id,
            depot_id,
            total_distance_km: 0.0,
            total_items: 0,
            total_weight_kg: 0.0,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Rewrites `points`' sequence numbers to a contiguous `0..len` range in
    /// their current order, without reordering them (§3 RoutePoint invariant).
    pub fn renumber(&mut self) {
        for (i, point) in self.points.iter_mut().enumerate() {
            point.sequence = i as u32;
        }
    }

    /// Order ids in sequence order, for feasibility/identity checks.
    pub fn order_ids(&self) -> Vec<&OrderId> {
        self.points.iter().map(|p| &p.order_id).collect()
    }
}
