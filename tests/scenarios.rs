//! End-to-end scenarios against the public `optimize()` entrypoint.
//!
//! Each test below is grounded in a literal scenario: one depot/courier
//! configuration, one assertion on the emitted routes and summary.

use mdvrp_core::config::{Algorithm, CpConfig, GaConfig, MatrixBackend, OptimizerConfig};
use mdvrp_core::models::{Courier, CourierId, Depot, DepotId, Location, Order, OrderId};
use mdvrp_core::{arbiter::OptimizationSummary, optimize};
use std::time::Duration;

fn depot(id: &str, lat: f64, lng: f64) -> Depot {
    Depot::new(DepotId::from(id), format!("Depot {id}"), Location::new(lat, lng, None).unwrap()).unwrap()
}

fn courier(id: &str, depot_id: &str, max_items: u32, max_weight_kg: f64, max_route_km: f64) -> Courier {
    Courier::new(CourierId::from(id), "Courier", DepotId::from(depot_id), max_items, max_weight_kg, max_route_km).unwrap()
}

fn order(id: &str, lat: f64, lng: f64, items: u32, weight_kg: f64) -> Order {
    Order::new_pending(OrderId::from(id), "Customer", None, Location::new(lat, lng, None).unwrap(), items, weight_kg).unwrap()
}

/// Scenario 1: one depot, two couriers (cap 10 items/50 kg/50 km each), four
/// orders of 3 items/5 kg. NN must emit two routes partitioning all four
/// orders, each within capacity.
#[test]
fn scenario_one_depot_two_couriers_four_orders() {
    let depots = vec![depot("d1", 0.0, 0.0)];
    let couriers = vec![
        courier("c1", "d1", 10, 50.0, 50.0),
        courier("c2", "d1", 10, 50.0, 50.0),
    ];
    let orders = vec![
        order("o1", 0.01, 0.0, 3, 5.0),
        order("o2", 0.02, 0.0, 3, 5.0),
        order("o3", 0.0, 0.01, 3, 5.0),
        order("o4", 0.0, 0.02, 3, 5.0),
    ];
    let config = OptimizerConfig::default().with_algorithm(Algorithm::NearestNeighbor);
    let (routes, summary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 2);
    let total_points: usize = routes.iter().map(|r| r.points.len()).sum();
    assert_eq!(total_points, 4);
    assert_eq!(summary.assigned_orders, 4);
    assert_eq!(summary.unassigned_order_ids.len(), 0);
    for route in &routes {
        assert!(route.total_items <= 10);
        assert!(route.total_weight_kg <= 50.0);
    }
}

/// Scenario 2: two depots, five orders split 3 (north) / 2 (south). Each
/// populated depot gets exactly one route.
#[test]
fn scenario_two_depots_partition_and_one_route_each() {
    let depots = vec![depot("north", 55.83, 37.44), depot("south", 55.62, 37.67)];
    let couriers = vec![courier("c1", "north", 10, 500.0, 500.0), courier("c2", "south", 10, 500.0, 500.0)];
    let orders = vec![
        order("o1", 55.84, 37.45, 1, 1.0),
        order("o2", 55.85, 37.46, 1, 1.0),
        order("o3", 55.86, 37.47, 1, 1.0),
        order("o4", 55.61, 37.66, 1, 1.0),
        order("o5", 55.60, 37.65, 1, 1.0),
    ];
    let config = OptimizerConfig::default().with_algorithm(Algorithm::NearestNeighbor);
    let (routes, summary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 2);
    assert_eq!(summary.assigned_orders, 5);
    let north_route = routes.iter().find(|r| r.depot_id == DepotId::from("north")).unwrap();
    let south_route = routes.iter().find(|r| r.depot_id == DepotId::from("south")).unwrap();
    assert_eq!(north_route.points.len(), 3);
    assert_eq!(south_route.points.len(), 2);
}

/// Scenario 3: one courier, distance limit too tight for both orders. NN
/// emits one order, drops the other; GA likewise emits one route and may
/// penalize the second as unassigned.
#[test]
fn scenario_distance_infeasibility_drops_the_farther_order_under_nn() {
    let depots = vec![depot("d1", 0.0, 0.0)];
    let couriers = vec![courier("c1", "d1", 10, 100.0, 1.0)];
    let orders = vec![order("o1", 0.01, 0.0, 1, 1.0), order("o2", 0.0, 0.01, 1, 1.0)];
    let config = OptimizerConfig::default().with_algorithm(Algorithm::NearestNeighbor);
    let (routes, summary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].points.len(), 1);
    assert_eq!(summary.unassigned_order_ids.len(), 1);
}

#[test]
fn scenario_distance_infeasibility_under_genetic_emits_one_route() {
    let depots = vec![depot("d1", 0.0, 0.0)];
    let couriers = vec![courier("c1", "d1", 10, 100.0, 1.0)];
    let orders = vec![order("o1", 0.01, 0.0, 1, 1.0), order("o2", 0.0, 0.01, 1, 1.0)];
    let ga = GaConfig::default().with_population_size(16).with_generations(20).with_timeout_s(5).with_seed(7);
    let config = OptimizerConfig::default().with_algorithm(Algorithm::Genetic).with_ga_config(ga);
    let (routes, summary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 1);
    assert!(routes[0].points.len() <= 2);
    assert_eq!(summary.total_orders, 2);
}

/// Scenario 4: CP (or its NN stand-in when the `cp` feature is disabled)
/// must fit exactly one of three single-item orders into a one-item-capacity
/// courier.
#[test]
fn scenario_cp_fallback_fits_exactly_one_order() {
    let depots = vec![depot("d1", 0.0, 0.0)];
    let couriers = vec![courier("c1", "d1", 1, 100.0, 100.0)];
    let orders = vec![
        order("o1", 0.01, 0.0, 1, 1.0),
        order("o2", 0.02, 0.0, 1, 1.0),
        order("o3", 0.03, 0.0, 1, 1.0),
    ];
    let cp = CpConfig::default().with_time_limit(Duration::from_secs(5));
    let config = OptimizerConfig::default().with_algorithm(Algorithm::OrTools).with_cp_config(cp);
    let (routes, summary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].points.len(), 1);
    assert_eq!(summary.assigned_orders, 1);
    assert_eq!(summary.unassigned_order_ids.len(), 2);
}

/// Scenario 5: arbiter de-duplication. A hand-built fault (two routes naming
/// the same courier id) collapses to the first one.
#[test]
fn scenario_session_arbiter_drops_duplicate_courier_routes() {
    use mdvrp_core::arbiter::arbitrate;
    use mdvrp_core::models::{Route, RouteId, RoutePoint};

    let mut first = Route::new(RouteId::from("r1"), CourierId::from("c1"), DepotId::from("d1"));
    first.points.push(RoutePoint::new(OrderId::from("o1"), 0));
    first.total_distance_km = 3.0;

    let mut duplicate = Route::new(RouteId::from("r2"), CourierId::from("c1"), DepotId::from("d1"));
    duplicate.points.push(RoutePoint::new(OrderId::from("o2"), 0));
    duplicate.total_distance_km = 9.0;

    let valid: std::collections::HashSet<OrderId> = [OrderId::from("o1"), OrderId::from("o2")].into_iter().collect();
    let (surviving, summary) = arbitrate(vec![first, duplicate], vec![], &valid, Algorithm::OrTools, 2, Duration::from_millis(10));

    assert_eq!(surviving.len(), 1);
    assert_eq!(surviving[0].id, RouteId::from("r1"));
    assert!((summary.total_distance_km - 3.0).abs() < 1e-9);
}

/// Scenario 6: road-network backend configured against an unreachable host
/// falls back to haversine transparently; the call still succeeds.
#[test]
fn scenario_remote_matrix_failure_falls_back_to_haversine() {
    let depots = vec![depot("d1", 1.0, 1.0)];
    let couriers = vec![courier("c1", "d1", 10, 100.0, 1000.0)];
    let orders = vec![order("o1", 1.01, 1.0, 1, 1.0)];
    let backend = MatrixBackend::RoadNetwork {
        base_url: "http://127.0.0.1:1".to_string(),
        request_timeout: Duration::from_millis(200),
    };
    let config = OptimizerConfig::default().with_matrix_backend(backend).with_algorithm(Algorithm::NearestNeighbor);
    let (routes, summary): (Vec<_>, OptimizationSummary) = optimize(&depots, &couriers, &orders, &config).unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(summary.assigned_orders, 1);
}

/// §8 boundary: zero pending orders is reported as an error by the core
/// (the collaborator may translate it into a no-op upstream).
#[test]
fn zero_pending_orders_is_reported_rather_than_silently_empty() {
    let depots = vec![depot("d1", 0.0, 0.0)];
    let couriers = vec![courier("c1", "d1", 10, 10.0, 10.0)];
    let delivered = {
        let mut o = order("o1", 0.01, 0.0, 1, 1.0);
        o.status = mdvrp_core::models::OrderStatus::Delivered;
        o
    };
    let result = optimize(&depots, &couriers, &[delivered], &OptimizerConfig::default());
    assert!(result.is_err());
}

/// §8 invariant: each courier id appears in at most one emitted route, even
/// across a multi-depot call.
#[test]
fn each_courier_appears_in_at_most_one_route() {
    use std::collections::HashSet;

    let depots = vec![depot("north", 10.0, 0.0), depot("south", -10.0, 0.0)];
    let couriers = vec![
        courier("c1", "north", 10, 500.0, 500.0),
        courier("c2", "north", 10, 500.0, 500.0),
        courier("c3", "south", 10, 500.0, 500.0),
    ];
    let orders = vec![
        order("o1", 10.01, 0.0, 1, 1.0),
        order("o2", 10.02, 0.0, 1, 1.0),
        order("o3", -10.01, 0.0, 1, 1.0),
    ];
    let config = OptimizerConfig::default().with_algorithm(Algorithm::NearestNeighbor);
    let (routes, _) = optimize(&depots, &couriers, &orders, &config).unwrap();

    let mut seen = HashSet::new();
    for route in &routes {
        assert!(seen.insert(route.courier_id.clone()));
    }
}
