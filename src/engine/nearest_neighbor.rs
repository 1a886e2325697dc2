//! Nearest-neighbor (NN) constructive engine (§4.3).
//!
//! Round-robin feasible fill ordered by proximity to depot, with per-step
//! constraint probing: a courier accepts the next order only if its current
//! load still fits *and* the candidate route, traversed nearest-neighbor
//! style from the depot, still returns within `max_route_km`.

use super::BuildOutcome;
use crate::config::MatrixBackend;
use crate::distance::{resolve_matrix, DistanceMatrix};
use crate::models::{Courier, CourierId, Depot, Order, Route, RouteId, RoutePoint};

struct CourierLoad<'a> {
    courier: &'a Courier,
    items: u32,
    weight_kg: f64,
    /// Node indices (1-based into the depot+orders location list) accepted
    /// so far, in the order accepted (re-ordered into NN traversal order by
    /// `nn_traversal` before being used for feasibility/output).
    picks: Vec<usize>,
}

impl<'a> CourierLoad<'a> {
    fn new(courier: &'a Courier) -> Self {
        Self {
            courier,
            items: 0,
            weight_kg: 0.0,
            picks: Vec::new(),
        }
    }
}

/// Builds routes for one depot using the nearest-neighbor heuristic.
///
/// `orders` must all belong to this depot's bucket (the caller partitions
/// first, §4.2). Distances are computed over the list `[depot, orders...]`
/// so node `0` is the depot and node `i` (`i >= 1`) is `orders[i - 1]`, using
/// whichever backend `matrix_backend` selects (§4.1, §6).
pub fn build(depot: &Depot, orders: &[&Order], couriers: &[Courier], matrix_backend: &MatrixBackend) -> BuildOutcome {
    let mut outcome = BuildOutcome::new();
    if couriers.is_empty() {
        outcome.unassigned = super::order_ids(orders);
        return outcome;
    }
    if orders.is_empty() {
        return outcome;
    }

    let locations: Vec<_> = std::iter::once(depot.location.clone())
        .chain(orders.iter().map(|o| o.location.clone()))
        .collect();
    let distances = resolve_matrix(matrix_backend, &locations);

    // Step 3: sort orders by ascending depot-to-order distance.
    let mut sorted_nodes: Vec<usize> = (1..=orders.len()).collect();
    sorted_nodes.sort_by(|&a, &b| {
        distances
            .get(0, a)
            .partial_cmp(&distances.get(0, b))
            .expect("distance should not be NaN")
    });

    let mut loads: Vec<CourierLoad> = couriers.iter().map(CourierLoad::new).collect();
    let mut cursor = 0usize;

    for &node in &sorted_nodes {
        let order = orders[node - 1];
        let mut accepted = false;

        for step in 0..loads.len() {
            let idx = (cursor + step) % loads.len();
            let load = &loads[idx];

            let tentative_items = load.items + order.items;
            let tentative_weight = load.weight_kg + order.weight_kg;
            if tentative_items > load.courier.max_items {
                continue;
            }
            if tentative_weight > load.courier.max_weight_kg {
                continue;
            }

            let mut candidate_picks = load.picks.clone();
            candidate_picks.push(node);
            let (traversal, total_km) = nn_traversal(&candidate_picks, &distances);
            if total_km > load.courier.max_route_km {
                continue;
            }

            let load = &mut loads[idx];
            load.items = tentative_items;
            load.weight_kg = tentative_weight;
            load.picks = traversal;
            cursor = (idx + 1) % loads.len();
            accepted = true;
            break;
        }

        if !accepted {
            outcome.unassigned.push(order.id.clone());
        }
    }

    for load in &loads {
        if load.picks.is_empty() {
            continue;
        }
        let mut route = Route::new(
            RouteId::from(format!("nn-{}-{}", depot.id, load.courier.id)),
            load.courier.id.clone(),
            depot.id.clone(),
        );
        let (_, total_km) = nn_traversal(&load.picks, &distances);
        route.total_distance_km = total_km;
        route.total_items = load.items;
        route.total_weight_kg = load.weight_kg;
        for (seq, &node) in load.picks.iter().enumerate() {
            route.points.push(RoutePoint::new(orders[node - 1].id.clone(), seq as u32));
        }
        outcome.routes.push(route);
    }

    outcome
}

/// Re-derives the nearest-neighbor visiting order over `picks` (a node-index
/// set, unordered) starting and ending at the depot (node 0), and returns
/// `(ordered_nodes, total_distance_km)` including the return leg.
///
/// This is the "recompute the tentative route" design choice from §4.3: the
/// feasibility check and the final emitted order both come from this
/// function so they can never disagree.
fn nn_traversal(picks: &[usize], distances: &DistanceMatrix) -> (Vec<usize>, f64) {
    let mut remaining = picks.to_vec();
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = 0usize;
    let mut total = 0.0;

    while !remaining.is_empty() {
        let (pos, &next) = remaining
            .iter()
            .enumerate()
            .min_by(|(_, &a), (_, &b)| {
                distances
                    .get(current, a)
                    .partial_cmp(&distances.get(current, b))
                    .expect("distance should not be NaN")
            })
            .expect("remaining is non-empty");
        total += distances.get(current, next);
        current = next;
        ordered.push(next);
        remaining.remove(pos);
    }
    total += distances.get(current, 0);

    (ordered, total)
}
