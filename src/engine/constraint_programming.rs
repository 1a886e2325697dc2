//! Constraint-programming (CP) engine (§4.4), backed by OR-Tools' routing
//! solver.
//!
//! Three dimensions — items, weight (grams), distance (meters) — with the
//! distance dimension carrying a per-vehicle soft upper bound instead of a
//! hard one, so a feasible-but-long route is found rather than discarded.
//! Falls back to the NN engine whenever the solver returns no solution.

use super::{nearest_neighbor, BuildOutcome};
use crate::config::{CpConfig, MatrixBackend};
use crate::distance::resolve_matrix;
use crate::models::{Courier, Depot, Order, Route, RouteId, RoutePoint};
use log::warn;
use or_tools::constraint_solver::{
    routing::{RoutingModel, RoutingModelStatus},
    routing_enums::{FirstSolutionStrategy, LocalSearchMetaheuristic},
    routing_index_manager::{RoutingIndexManager, RoutingIndexManagerVehiclePlan, RoutingNodeIndex, RoutingNodeIndexVector},
    routing_parameters::RoutingSearchParameters,
};

/// Soft-upper-bound penalty per meter of overage, mirroring the original
/// OR-Tools formulation's `100_000` per unit.
const DISTANCE_PENALTY: i64 = 100_000;

fn to_meters(km: f64) -> i64 {
    (km * 1000.0).round() as i64
}

fn to_grams(kg: f64) -> i64 {
    (kg * 1000.0).round() as i64
}

fn search_parameters(time_limit: std::time::Duration) -> RoutingSearchParameters {
    let mut params = RoutingSearchParameters::new();
    params.set_first_solution_strategy(FirstSolutionStrategy::PathCheapestArc);
    params.set_local_search_metaheuristic(LocalSearchMetaheuristic::GuidedLocalSearch);
    params.set_time_limit(time_limit);
    params
}

fn solution_is_usable(status: RoutingModelStatus) -> bool {
    matches!(
        status,
        RoutingModelStatus::RoutingSuccess | RoutingModelStatus::RoutingPartialSuccessLocalOptimumNotReached
    )
}

/// Builds routes for one depot using the CP engine; falls back to NN on
/// infeasibility (§4.4).
pub fn build(depot: &Depot, orders: &[&Order], couriers: &[Courier], config: &CpConfig, matrix_backend: &MatrixBackend) -> BuildOutcome {
    if couriers.is_empty() {
        let mut outcome = BuildOutcome::new();
        outcome.unassigned = super::order_ids(orders);
        return outcome;
    }
    if orders.is_empty() {
        return BuildOutcome::new();
    }

    let locations: Vec<_> = std::iter::once(depot.location.clone())
        .chain(orders.iter().map(|o| o.location.clone()))
        .collect();
    let distances = resolve_matrix(matrix_backend, &locations);
    let num_nodes = locations.len() as std::ffi::c_int;
    let num_vehicles = couriers.len() as std::ffi::c_int;

    let manager = RoutingIndexManager::new(
        num_nodes,
        num_vehicles,
        RoutingIndexManagerVehiclePlan::Depot(RoutingNodeIndex::new(0)),
    );
    let mut routing = RoutingModel::new(&manager, None);

    let transit_callback = |from_index: i64, to_index: i64| -> i64 {
        let from = manager.index_to_node(from_index).value() as usize;
        let to = manager.index_to_node(to_index).value() as usize;
        to_meters(distances.get(from, to))
    };
    let transit_index = routing.register_transit_callback(&transit_callback);
    routing.set_arc_cost_evaluator_of_all_vehicles(transit_index);

    let items_callback = |_from_index: i64, to_index: i64| -> i64 {
        let to = manager.index_to_node(to_index).value() as usize;
        if to == 0 {
            0
        } else {
            orders[to - 1].items as i64
        }
    };
    let items_index = routing.register_transit_callback(&items_callback);
    let item_capacities: Vec<i64> = couriers.iter().map(|c| c.max_items as i64).collect();
    routing.add_dimension_with_vehicle_capacity(items_index, 0, &item_capacities, true, "Items");

    let weight_callback = |_from_index: i64, to_index: i64| -> i64 {
        let to = manager.index_to_node(to_index).value() as usize;
        if to == 0 {
            0
        } else {
            to_grams(orders[to - 1].weight_kg)
        }
    };
    let weight_index = routing.register_transit_callback(&weight_callback);
    let weight_capacities: Vec<i64> = couriers.iter().map(|c| to_grams(c.max_weight_kg)).collect();
    routing.add_dimension_with_vehicle_capacity(weight_index, 0, &weight_capacities, true, "Weight");

    routing.add_dimension(transit_index, 0, i64::MAX / 4, true, "Distance");
    let distance_dimension = routing.get_mutable_dimension("Distance").expect("Distance dimension was just added");
    for (vehicle, courier) in couriers.iter().enumerate() {
        let end_index = routing.end(vehicle as std::ffi::c_int);
        distance_dimension.set_cumul_var_soft_upper_bound(end_index, to_meters(courier.max_route_km), DISTANCE_PENALTY);
    }

    let search_params = search_parameters(config.time_limit);
    let solution = routing.solve_with_parameters(&search_params);

    if !solution.has_contents() || !solution_is_usable(solution.status()) {
        warn!("CP solver returned no usable solution for depot {}, delegating to NN", depot.id);
        return nearest_neighbor::build(depot, orders, couriers, matrix_backend);
    }

    extract_solution(&routing, &manager, &solution, couriers, |_vehicle| depot.id.clone(), |node| {
        if node == 0 {
            None
        } else {
            let order = orders[node - 1];
            Some((order.id.clone(), order.items, order.weight_kg))
        }
    })
}

/// Formulates one global CVRP model spanning every depot, one vehicle per
/// courier fixed to start/end at its anchor depot's node (§4.6 "Joint-CP
/// mode").
pub fn build_joint(depots: &[Depot], orders: &[&Order], couriers: &[Courier], config: &CpConfig, matrix_backend: &MatrixBackend) -> BuildOutcome {
    if couriers.is_empty() || depots.is_empty() {
        let mut outcome = BuildOutcome::new();
        outcome.unassigned = super::order_ids(orders);
        return outcome;
    }
    if orders.is_empty() {
        return BuildOutcome::new();
    }

    let depot_offset = depots.len();
    let locations: Vec<_> = depots
        .iter()
        .map(|d| d.location.clone())
        .chain(orders.iter().map(|o| o.location.clone()))
        .collect();
    let distances = resolve_matrix(matrix_backend, &locations);
    let num_nodes = locations.len() as std::ffi::c_int;
    let num_vehicles = couriers.len() as std::ffi::c_int;

    let anchor_node = |courier: &Courier| -> i32 {
        depots
            .iter()
            .position(|d| d.id == courier.depot_id)
            .unwrap_or(0) as i32
    };
    let starts: RoutingNodeIndexVector = couriers.iter().map(|c| RoutingNodeIndex::new(anchor_node(c))).collect();
    let ends: RoutingNodeIndexVector = couriers.iter().map(|c| RoutingNodeIndex::new(anchor_node(c))).collect();

    let manager = RoutingIndexManager::new(num_nodes, num_vehicles, RoutingIndexManagerVehiclePlan::Map { starts, ends });
    let mut routing = RoutingModel::new(&manager, None);

    let transit_callback = |from_index: i64, to_index: i64| -> i64 {
        let from = manager.index_to_node(from_index).value() as usize;
        let to = manager.index_to_node(to_index).value() as usize;
        to_meters(distances.get(from, to))
    };
    let transit_index = routing.register_transit_callback(&transit_callback);
    routing.set_arc_cost_evaluator_of_all_vehicles(transit_index);

    let items_callback = |_from_index: i64, to_index: i64| -> i64 {
        let to = manager.index_to_node(to_index).value() as usize;
        if to < depot_offset {
            0
        } else {
            orders[to - depot_offset].items as i64
        }
    };
    let items_index = routing.register_transit_callback(&items_callback);
    let item_capacities: Vec<i64> = couriers.iter().map(|c| c.max_items as i64).collect();
    routing.add_dimension_with_vehicle_capacity(items_index, 0, &item_capacities, true, "Items");

    let weight_callback = |_from_index: i64, to_index: i64| -> i64 {
        let to = manager.index_to_node(to_index).value() as usize;
        if to < depot_offset {
            0
        } else {
            to_grams(orders[to - depot_offset].weight_kg)
        }
    };
    let weight_index = routing.register_transit_callback(&weight_callback);
    let weight_capacities: Vec<i64> = couriers.iter().map(|c| to_grams(c.max_weight_kg)).collect();
    routing.add_dimension_with_vehicle_capacity(weight_index, 0, &weight_capacities, true, "Weight");

    routing.add_dimension(transit_index, 0, i64::MAX / 4, true, "Distance");
    let distance_dimension = routing.get_mutable_dimension("Distance").expect("Distance dimension was just added");
    for (vehicle, courier) in couriers.iter().enumerate() {
        let end_index = routing.end(vehicle as std::ffi::c_int);
        distance_dimension.set_cumul_var_soft_upper_bound(end_index, to_meters(courier.max_route_km), DISTANCE_PENALTY);
    }

    let search_params = search_parameters(config.time_limit);
    let solution = routing.solve_with_parameters(&search_params);

    if !solution.has_contents() || !solution_is_usable(solution.status()) {
        // Joint mode has no single depot to delegate to; split into
        // per-depot buckets and let single-depot NN handle each.
        warn!("joint CP solver returned no usable solution across {} depots, delegating to per-depot NN", depots.len());
        let buckets = crate::partition::partition(
            &orders.iter().map(|o| (*o).clone()).collect::<Vec<_>>(),
            depots,
        );
        let mut outcome = BuildOutcome::new();
        for depot in depots {
            let depot_orders: Vec<&Order> = buckets.get(&depot.id).map(|v| v.to_vec()).unwrap_or_default();
            let depot_couriers: Vec<Courier> = couriers.iter().filter(|c| c.depot_id == depot.id).cloned().collect();
            let sub = nearest_neighbor::build(depot, &depot_orders, &depot_couriers, matrix_backend);
            outcome.routes.extend(sub.routes);
            outcome.unassigned.extend(sub.unassigned);
        }
        return outcome;
    }

    extract_solution(
        &routing,
        &manager,
        &solution,
        couriers,
        |vehicle| depots[anchor_node(&couriers[vehicle]) as usize].id.clone(),
        |node| {
            if node < depot_offset {
                None
            } else {
                let order = orders[node - depot_offset];
                Some((order.id.clone(), order.items, order.weight_kg))
            }
        },
    )
}

fn extract_solution<DepotOf, OrderAtNode>(
    routing: &or_tools::constraint_solver::routing::RoutingModel,
    manager: &RoutingIndexManager,
    solution: &or_tools::constraint_solver::routing::Assignment,
    couriers: &[Courier],
    depot_of_vehicle: DepotOf,
    order_at_node: OrderAtNode,
) -> BuildOutcome
where
    DepotOf: Fn(usize) -> crate::models::DepotId,
    OrderAtNode: Fn(usize) -> Option<(crate::models::OrderId, u32, f64)>,
{
    let mut outcome = BuildOutcome::new();

    for (vehicle, courier) in couriers.iter().enumerate() {
        let mut index = routing.start(vehicle as std::ffi::c_int);
        let mut points = Vec::new();
        let mut total_meters = 0i64;
        let mut total_items = 0u32;
        let mut total_weight_kg = 0.0;
        let mut seq = 0u32;

        while !routing.is_end(index) {
            let node = manager.index_to_node(index).value() as usize;
            if let Some((order_id, items, weight_kg)) = order_at_node(node) {
                points.push(RoutePoint::new(order_id, seq));
                total_items += items;
                total_weight_kg += weight_kg;
                seq += 1;
            }
            let next_var = routing.next_var(index).expect("index is not end");
            let next_index = solution.value(next_var).expect("solved model has a value for every next var");
            total_meters += routing.get_arc_cost_for_vehicle(index, next_index, vehicle as i64);
            index = next_index;
        }

        if points.is_empty() {
            continue;
        }

        let depot_id = depot_of_vehicle(vehicle);
        let mut route = Route::new(
            RouteId::from(format!("cp-{}-{}", depot_id, courier.id)),
            courier.id.clone(),
            depot_id,
        );
        route.total_distance_km = total_meters as f64 / 1000.0;
        route.total_items = total_items;
        route.total_weight_kg = total_weight_kg;
        route.points = points;
        outcome.routes.push(route);
    }

    outcome
}
