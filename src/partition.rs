//! Depot partitioner (§4.2).

use crate::distance::haversine_km;
use crate::models::{Depot, DepotId, Order};
use std::collections::HashMap;

/// Assigns each order to its nearest depot by straight-line distance.
///
/// Orders whose location is unusable are assigned to the first depot (§4.2,
/// §7 "Unreachable order"). Ties are broken by first encountered depot.
/// Stateless and deterministic.
///
/// # Panics
///
/// Does not panic, but returns an empty map if `depots` is empty; callers
/// must validate non-empty depots beforehand (§7 "Invalid input").
pub fn partition<'a>(orders: &'a [Order], depots: &[Depot]) -> HashMap<DepotId, Vec<&'a Order>> {
    let mut buckets: HashMap<DepotId, Vec<&Order>> = HashMap::new();
    if depots.is_empty() {
        return buckets;
    }
    for depot in depots {
        buckets.entry(depot.id.clone()).or_default();
    }

    for order in orders {
        let target = nearest_depot(order, depots);
        buckets.entry(target.id.clone()).or_default().push(order);
    }

    buckets
}

fn nearest_depot<'d>(order: &Order, depots: &'d [Depot]) -> &'d Depot {
    if !order.has_usable_location() {
        return &depots[0];
    }

    let mut best = &depots[0];
    let mut best_dist = haversine_km(&order.location, &best.location);
    for depot in &depots[1..] {
        let d = haversine_km(&order.location, &depot.location);
        if d < best_dist {
            best = depot;
            best_dist = d;
        }
    }
    best
}
