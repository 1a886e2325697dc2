//! Multi-depot coordinator (§4.6).
//!
//! Dispatches to the configured engine, either once per depot (the default
//! for every engine) or, for the CP engine with multiple depots, as one
//! joint model spanning all depots (`cp.joint_multi_depot`).

use crate::config::{Algorithm, OptimizerConfig};
use crate::engine::{constraint_programming, genetic, nearest_neighbor, BuildOutcome};
use crate::models::{Courier, Depot, Order, OrderId};
use crate::partition;

/// Runs the configured engine across every depot and returns the combined,
/// not-yet-arbitrated outcome.
pub fn coordinate(depots: &[Depot], couriers: &[Courier], orders: &[Order], config: &OptimizerConfig) -> BuildOutcome {
    if config.algorithm == Algorithm::OrTools && config.cp.joint_multi_depot && depots.len() > 1 {
        let refs: Vec<&Order> = orders.iter().collect();
        return constraint_programming::build_joint(depots, &refs, couriers, &config.cp, &config.matrix_backend);
    }

    let buckets = partition::partition(orders, depots);
    let mut combined = BuildOutcome::new();

    for depot in depots {
        let depot_orders = buckets.get(&depot.id).cloned().unwrap_or_default();
        let depot_couriers: Vec<Courier> = couriers.iter().filter(|c| c.depot_id == depot.id).cloned().collect();

        let outcome = run_engine(depot, &depot_orders, &depot_couriers, config);
        combined.routes.extend(outcome.routes);
        combined.unassigned.extend(outcome.unassigned);
    }

    combined
}

fn run_engine(depot: &Depot, orders: &[&Order], couriers: &[Courier], config: &OptimizerConfig) -> BuildOutcome {
    match config.algorithm {
        Algorithm::NearestNeighbor => nearest_neighbor::build(depot, orders, couriers, &config.matrix_backend),
        Algorithm::OrTools => constraint_programming::build(depot, orders, couriers, &config.cp, &config.matrix_backend),
        Algorithm::Genetic => genetic::build(depot, orders, couriers, &config.ga, &config.matrix_backend),
    }
}

/// Collects every order id referenced across `routes`.
pub fn assigned_order_ids(routes: &[crate::models::Route]) -> Vec<OrderId> {
    routes.iter().flat_map(|r| r.points.iter().map(|p| p.order_id.clone())).collect()
}
