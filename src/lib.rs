//! # mdvrp-core
//!
//! Multi-depot capacitated vehicle routing core: distance matrices, depot
//! partitioning, and nearest-neighbor/constraint-programming/genetic route
//! builders, arbitrated into one route set per call.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Depot, Courier, Order, Route)
//! - [`config`] — Per-call optimization configuration
//! - [`distance`] — Distance matrix providers (haversine, road-network)
//! - [`partition`] — Nearest-depot order partitioner
//! - [`engine`] — The three route-building engines
//! - [`coordinator`] — Multi-depot dispatch across engines
//! - [`arbiter`] — Deduplication and call summary
//! - [`error`] — Crate-level error type

pub mod arbiter;
pub mod config;
pub mod coordinator;
pub mod distance;
pub mod engine;
pub mod error;
pub mod models;
pub mod partition;

use config::OptimizerConfig;
use error::{OptimizerError, Result};
use log::info;
use models::{Courier, Depot, Order, Route};
use std::collections::HashSet;
use std::time::Instant;

pub use arbiter::OptimizationSummary;

/// Runs one optimization call: partitions orders, dispatches to the
/// configured engine, and arbitrates the result (§6).
///
/// Returns [`OptimizerError`] only for the "invalid input" row of §7 — empty
/// depots/couriers/orders, or a `depot_filter` naming a depot that doesn't
/// exist. Every other failure mode (remote-matrix errors, CP infeasibility,
/// engine-output glitches) degrades silently inside the pipeline.
pub fn optimize(depots: &[Depot], couriers: &[Courier], orders: &[Order], config: &OptimizerConfig) -> Result<(Vec<Route>, OptimizationSummary)> {
    if depots.is_empty() {
        return Err(OptimizerError::NoDepots);
    }
    if couriers.is_empty() {
        return Err(OptimizerError::NoCouriers);
    }
    let pending: Vec<Order> = orders.iter().filter(|o| o.is_pending()).cloned().collect();
    if pending.is_empty() {
        return Err(OptimizerError::NoPendingOrders);
    }

    let (active_depots, active_couriers): (Vec<Depot>, Vec<Courier>) = match &config.depot_filter {
        None => (depots.to_vec(), couriers.to_vec()),
        Some(depot_id) => {
            if !depots.iter().any(|d| d.id.as_str() == depot_id) {
                return Err(OptimizerError::UnknownDepotFilter);
            }
            let filtered_depots: Vec<Depot> = depots.iter().filter(|d| d.id.as_str() == depot_id).cloned().collect();
            let filtered_couriers: Vec<Courier> = couriers.iter().filter(|c| c.depot_id.as_str() == depot_id).cloned().collect();
            (filtered_depots, filtered_couriers)
        }
    };

    let started = Instant::now();
    let outcome = coordinator::coordinate(&active_depots, &active_couriers, &pending, config);
    let elapsed = started.elapsed();

    let valid_order_ids: HashSet<_> = pending.iter().map(|o| o.id.clone()).collect();
    let (routes, summary) = arbiter::arbitrate(
        outcome.routes,
        outcome.unassigned,
        &valid_order_ids,
        config.algorithm,
        pending.len(),
        elapsed,
    );

    info!(
        "optimize: algorithm={:?} depots={} couriers={} orders={} assigned={} elapsed_s={:.3}",
        config.algorithm,
        active_depots.len(),
        active_couriers.len(),
        pending.len(),
        summary.assigned_orders,
        summary.execution_time_s
    );

    Ok((routes, summary))
}
