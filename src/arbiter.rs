//! Session arbiter (§4.7).
//!
//! Final pass over every engine's proposed routes before they leave the
//! crate: drops duplicate courier assignments and empty routes, and builds
//! the call summary.

use crate::config::Algorithm;
use crate::models::{CourierId, OrderId, Route};
use log::warn;
use std::collections::HashSet;
use std::time::Duration;

/// Report returned alongside the surviving routes for one optimization call
/// (§6 "Outputs produced").
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSummary {
    pub algorithm: Algorithm,
    pub total_distance_km: f64,
    pub assigned_orders: usize,
    pub total_orders: usize,
    pub execution_time_s: f64,
    pub unassigned_order_ids: Vec<OrderId>,
}

/// Drops points naming an order id outside `valid_order_ids` (continuing the
/// rest of the route — §7 "Malformed order id in engine output"), then drops
/// routes whose courier id has already been emitted this call (keeping the
/// first occurrence) and routes left with no points, then builds the summary.
///
/// `total_orders` is the count of pending orders presented to the call;
/// `unassigned_order_ids` is whatever the engine(s) reported as unassigned.
pub fn arbitrate(
    proposed_routes: Vec<Route>,
    unassigned_order_ids: Vec<OrderId>,
    valid_order_ids: &HashSet<OrderId>,
    algorithm: Algorithm,
    total_orders: usize,
    execution_time: Duration,
) -> (Vec<Route>, OptimizationSummary) {
    let mut seen_couriers: HashSet<CourierId> = HashSet::new();
    let mut surviving = Vec::with_capacity(proposed_routes.len());

    for mut route in proposed_routes {
        let before = route.points.len();
        route.points.retain(|p| valid_order_ids.contains(&p.order_id));
        if route.points.len() != before {
            warn!(
                "route {} named {} order id(s) outside the pending set; dropping them and continuing",
                route.id,
                before - route.points.len()
            );
            route.renumber();
        }

        if route.is_empty() {
            continue;
        }
        if !seen_couriers.insert(route.courier_id.clone()) {
            continue;
        }
        surviving.push(route);
    }

    let total_distance_km = surviving.iter().map(|r| r.total_distance_km).sum();
    let assigned_orders = surviving.iter().map(|r| r.points.len()).sum();

    let summary = OptimizationSummary {
        algorithm,
        total_distance_km,
        assigned_orders,
        total_orders,
        execution_time_s: execution_time.as_secs_f64(),
        unassigned_order_ids,
    };

    (surviving, summary)
}
