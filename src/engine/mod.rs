//! Single-depot route-building engines (§4.3, §4.4, §4.5).
//!
//! All three engines share one contract: `build(depot, orders, couriers,
//! matrix_backend) -> BuildOutcome`. The multi-depot coordinator
//! (`crate::coordinator`) invokes
//! one engine per depot (or, for the CP engine, optionally one joint model
//! across all depots — §4.6).

#[cfg(feature = "cp")]
pub mod constraint_programming;
pub mod genetic;
pub mod nearest_neighbor;

/// Stub used when the `cp` Cargo feature is disabled: the OR-Tools-backed
/// engine isn't compiled in, so callers fall straight through to NN.
#[cfg(not(feature = "cp"))]
pub mod constraint_programming {
    use super::BuildOutcome;
    use crate::config::{CpConfig, MatrixBackend};
    use crate::models::{Courier, Depot, Order};

    pub fn build(depot: &Depot, orders: &[&Order], couriers: &[Courier], _config: &CpConfig, matrix_backend: &MatrixBackend) -> BuildOutcome {
        super::nearest_neighbor::build(depot, orders, couriers, matrix_backend)
    }

    pub fn build_joint(depots: &[Depot], orders: &[&Order], couriers: &[Courier], _config: &CpConfig, matrix_backend: &MatrixBackend) -> BuildOutcome {
        let owned_orders: Vec<Order> = orders.iter().map(|o| (*o).clone()).collect();
        let buckets = crate::partition::partition(&owned_orders, depots);
        let mut outcome = BuildOutcome::new();
        for depot in depots {
            let depot_orders: Vec<&Order> = buckets.get(&depot.id).map(|v| v.to_vec()).unwrap_or_default();
            let depot_couriers: Vec<Courier> = couriers.iter().filter(|c| c.depot_id == depot.id).cloned().collect();
            let sub = super::nearest_neighbor::build(depot, &depot_orders, &depot_couriers, matrix_backend);
            outcome.routes.extend(sub.routes);
            outcome.unassigned.extend(sub.unassigned);
        }
        outcome
    }
}

use crate::models::{Order, OrderId, Route};

/// Result of one engine invocation for one depot (or, in joint-CP mode, the
/// whole multi-depot instance).
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub routes: Vec<Route>,
    pub unassigned: Vec<OrderId>,
}

impl BuildOutcome {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Locations in this order go into index 0 of the per-depot distance matrix;
/// all engines build their local location list as `[depot, order_1, ...,
/// order_n]` so node index `i > 0` maps to `orders[i - 1]` (§4.3 step 1).
pub(crate) fn order_ids(orders: &[&Order]) -> Vec<OrderId> {
    orders.iter().map(|o| o.id.clone()).collect()
}
