//! Genetic algorithm (GA) engine (§4.5).
//!
//! Population-based search over route-set individuals: tournament
//! selection, route-exchange crossover with duplicate repair, three
//! mutation operators, and elitism. Self-contained — does not depend on any
//! external metaheuristics crate.

use super::BuildOutcome;
use crate::config::{GaConfig, MatrixBackend};
use crate::distance::{resolve_matrix, DistanceMatrix};
use crate::models::{Courier, Depot, Order, Route, RouteId, RoutePoint};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// One courier's picks (node indices into `[depot, orders...]`), in visiting
/// order. Distance is the sequential order plus the return leg — the GA
/// mutates this order directly, unlike the NN engine's re-derived traversal.
#[derive(Debug, Clone, Default)]
struct GaRoute {
    picks: Vec<usize>,
}

/// A candidate solution: one [`GaRoute`] per courier, indexed the same as
/// the `couriers` slice passed to [`build`].
#[derive(Debug, Clone)]
struct Individual {
    routes: Vec<GaRoute>,
    fitness: f64,
}

struct Context<'a> {
    orders: &'a [&'a Order],
    couriers: &'a [Courier],
    distances: DistanceMatrix,
}

impl<'a> Context<'a> {
    fn route_distance(&self, picks: &[usize]) -> f64 {
        if picks.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        let mut current = 0usize;
        for &node in picks {
            total += self.distances.get(current, node);
            current = node;
        }
        total += self.distances.get(current, 0);
        total
    }

    fn route_items(&self, picks: &[usize]) -> u32 {
        picks.iter().map(|&n| self.orders[n - 1].items).sum()
    }

    fn route_weight(&self, picks: &[usize]) -> f64 {
        picks.iter().map(|&n| self.orders[n - 1].weight_kg).sum()
    }

    fn fitness(&self, individual: &Individual) -> f64 {
        let assigned: usize = individual.routes.iter().map(|r| r.picks.len()).sum();
        if assigned == 0 && !self.orders.is_empty() {
            return f64::INFINITY;
        }

        let mut total_distance = 0.0;
        let mut route_count = 0usize;
        let mut violation_penalty = 0.0;

        for (idx, route) in individual.routes.iter().enumerate() {
            if route.picks.is_empty() {
                continue;
            }
            route_count += 1;
            let dist = self.route_distance(&route.picks);
            total_distance += dist;
            let max_km = self.couriers[idx].max_route_km;
            violation_penalty += 10_000.0 * (dist - max_km).max(0.0);
        }

        let unassigned = self.orders.len() - assigned;

        total_distance + 10.0 * route_count as f64 + 1_000.0 * unassigned as f64 + violation_penalty
    }
}

/// Builds routes for one depot using the genetic algorithm engine.
pub fn build(depot: &Depot, orders: &[&Order], couriers: &[Courier], config: &GaConfig, matrix_backend: &MatrixBackend) -> BuildOutcome {
    let mut outcome = BuildOutcome::new();
    if couriers.is_empty() || orders.is_empty() {
        outcome.unassigned = super::order_ids(orders);
        return outcome;
    }

    let locations: Vec<_> = std::iter::once(depot.location.clone())
        .chain(orders.iter().map(|o| o.location.clone()))
        .collect();
    let ctx = Context {
        orders,
        couriers,
        distances: resolve_matrix(matrix_backend, &locations),
    };

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let mut population: Vec<Individual> = (0..config.population_size.max(1))
        .map(|_| random_individual(&ctx, &mut rng))
        .collect();
    for ind in &mut population {
        ind.fitness = ctx.fitness(ind);
    }

    let mut best = population
        .iter()
        .min_by(|a, b| a.fitness.partial_cmp(&b.fitness).expect("fitness is not NaN"))
        .cloned()
        .expect("population is non-empty");

    let tournament_size = (population.len() as f64 * 0.1).ceil().max(2.0) as usize;
    let elite_count = (population.len() as f64 * config.elitism_fraction()).ceil() as usize;
    let elite_count = elite_count.min(population.len());

    let deadline = Instant::now() + Duration::from_secs(config.timeout_s.max(1));

    for _ in 0..config.generations {
        if Instant::now() >= deadline {
            break;
        }
        population.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).expect("fitness is not NaN"));

        let mut next_gen: Vec<Individual> = population[..elite_count].to_vec();
        while next_gen.len() < population.len() {
            let parent1 = tournament_select(&population, tournament_size, &mut rng);
            let parent2 = tournament_select(&population, tournament_size, &mut rng);

            let (mut child1, mut child2) = if rng.random::<f64>() < config.crossover_rate {
                crossover(&ctx, parent1, parent2, &mut rng)
            } else {
                (parent1.clone(), parent2.clone())
            };

            if rng.random::<f64>() < config.mutation_rate {
                mutate(&ctx, &mut child1, &mut rng);
            }
            if rng.random::<f64>() < config.mutation_rate {
                mutate(&ctx, &mut child2, &mut rng);
            }

            child1.fitness = ctx.fitness(&child1);
            child2.fitness = ctx.fitness(&child2);

            next_gen.push(child1);
            if next_gen.len() < population.len() {
                next_gen.push(child2);
            }
        }
        population = next_gen;

        if let Some(candidate) = population
            .iter()
            .min_by(|a, b| a.fitness.partial_cmp(&b.fitness).expect("fitness is not NaN"))
        {
            if candidate.fitness < best.fitness {
                best = candidate.clone();
            }
        }
    }

    for (idx, ga_route) in best.routes.iter().enumerate() {
        if ga_route.picks.is_empty() {
            continue;
        }
        let courier = &couriers[idx];
        let mut route = Route::new(
            RouteId::from(format!("ga-{}-{}", depot.id, courier.id)),
            courier.id.clone(),
            depot.id.clone(),
        );
        route.total_distance_km = ctx.route_distance(&ga_route.picks);
        route.total_items = ctx.route_items(&ga_route.picks);
        route.total_weight_kg = ctx.route_weight(&ga_route.picks);
        for (seq, &node) in ga_route.picks.iter().enumerate() {
            route.points.push(RoutePoint::new(orders[node - 1].id.clone(), seq as u32));
        }
        outcome.routes.push(route);
    }

    let assigned_nodes: std::collections::HashSet<usize> =
        best.routes.iter().flat_map(|r| r.picks.iter().copied()).collect();
    outcome.unassigned = (1..=orders.len())
        .filter(|n| !assigned_nodes.contains(n))
        .map(|n| orders[n - 1].id.clone())
        .collect();

    outcome
}

/// Randomized constructive heuristic mirroring NN but with shuffled visit
/// order per courier (§4.5 "Initialization").
fn random_individual(ctx: &Context, rng: &mut StdRng) -> Individual {
    let mut shuffled: Vec<usize> = (1..=ctx.orders.len()).collect();
    fisher_yates(&mut shuffled, rng);

    let mut routes: Vec<GaRoute> = ctx.couriers.iter().map(|_| GaRoute::default()).collect();
    let mut cursor = 0usize;
    let mut unassigned = Vec::new();

    for node in shuffled {
        let order = ctx.orders[node - 1];
        let mut accepted = false;
        for step in 0..routes.len() {
            let idx = (cursor + step) % routes.len();
            let courier = &ctx.couriers[idx];
            let tentative_items = ctx.route_items(&routes[idx].picks) + order.items;
            let tentative_weight = ctx.route_weight(&routes[idx].picks) + order.weight_kg;
            if tentative_items > courier.max_items || tentative_weight > courier.max_weight_kg {
                continue;
            }
            let mut candidate = routes[idx].picks.clone();
            candidate.push(node);
            if ctx.route_distance(&candidate) > courier.max_route_km {
                continue;
            }
            routes[idx].picks = candidate;
            cursor = (idx + 1) % routes.len();
            accepted = true;
            break;
        }
        if !accepted {
            unassigned.push(node);
        }
    }

    redistribute(ctx, &mut routes, unassigned);

    Individual { routes, fitness: 0.0 }
}

fn fisher_yates(values: &mut [usize], rng: &mut StdRng) {
    for i in (1..values.len()).rev() {
        let j = rng.random_range(0..=i as u64) as usize;
        values.swap(i, j);
    }
}

/// Appends each node in `unassigned` to any route with remaining capacity
/// and distance budget, then — if still unassigned — to an otherwise-empty
/// courier's route (§4.5 "Initialization").
fn redistribute(ctx: &Context, routes: &mut [GaRoute], unassigned: Vec<usize>) {
    for node in unassigned {
        let order = ctx.orders[node - 1];
        let mut placed = false;

        for idx in 0..routes.len() {
            let courier = &ctx.couriers[idx];
            let tentative_items = ctx.route_items(&routes[idx].picks) + order.items;
            let tentative_weight = ctx.route_weight(&routes[idx].picks) + order.weight_kg;
            if tentative_items > courier.max_items || tentative_weight > courier.max_weight_kg {
                continue;
            }
            let mut candidate = routes[idx].picks.clone();
            candidate.push(node);
            if ctx.route_distance(&candidate) > courier.max_route_km {
                continue;
            }
            routes[idx].picks = candidate;
            placed = true;
            break;
        }

        if !placed {
            if let Some(idx) = routes.iter().position(|r| r.picks.is_empty()) {
                routes[idx].picks.push(node);
            }
            // else: remains unassigned; fitness's 1000x-per-unassigned term penalizes this.
        }
    }
}

fn tournament_select<'p>(population: &'p [Individual], size: usize, rng: &mut StdRng) -> &'p Individual {
    let mut best: Option<&Individual> = None;
    for _ in 0..size {
        let idx = rng.random_range(0..population.len() as u64) as usize;
        let candidate = &population[idx];
        best = match best {
            Some(b) if b.fitness <= candidate.fitness => Some(b),
            _ => Some(candidate),
        };
    }
    best.expect("size > 0")
}

/// Route-exchange crossover with duplicate repair (§4.5 "Crossover").
fn crossover(ctx: &Context, parent1: &Individual, parent2: &Individual, rng: &mut StdRng) -> (Individual, Individual) {
    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();

    let n = child1.routes.len().min(child2.routes.len());
    if n > 0 {
        let a = rng.random_range(0..n as u64) as usize;
        let b = rng.random_range(0..n as u64) as usize;
        std::mem::swap(&mut child1.routes[a], &mut child2.routes[b]);
    }

    repair_duplicates(ctx, &mut child1);
    repair_duplicates(ctx, &mut child2);

    (child1, child2)
}

/// Removes duplicate order references across an individual (keeping the
/// first occurrence) and redistributes the removed ones.
fn repair_duplicates(ctx: &Context, individual: &mut Individual) {
    let mut seen = std::collections::HashSet::new();
    let mut removed = Vec::new();

    for route in &mut individual.routes {
        let mut kept = Vec::with_capacity(route.picks.len());
        for node in route.picks.drain(..) {
            if seen.insert(node) {
                kept.push(node);
            } else {
                removed.push(node);
            }
        }
        route.picks = kept;
    }

    if !removed.is_empty() {
        redistribute(ctx, &mut individual.routes, removed);
    }
}

/// Applies one of the three mutation operators, chosen uniformly (§4.5
/// "Mutation").
fn mutate(ctx: &Context, individual: &mut Individual, rng: &mut StdRng) {
    match rng.random_range(0..3u64) {
        0 => mutate_swap(individual, rng),
        1 => mutate_move(ctx, individual, rng),
        _ => mutate_reverse_segment(individual, rng),
    }
}

fn nonempty_route_indices(individual: &Individual) -> Vec<usize> {
    individual
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.picks.is_empty())
        .map(|(i, _)| i)
        .collect()
}

fn mutate_swap(individual: &mut Individual, rng: &mut StdRng) {
    let candidates = nonempty_route_indices(individual);
    if candidates.is_empty() {
        debug!("mutate_swap: no non-empty routes, leaving individual unchanged");
        return;
    }
    let r1 = candidates[rng.random_range(0..candidates.len() as u64) as usize];
    let r2 = candidates[rng.random_range(0..candidates.len() as u64) as usize];
    let p1 = rng.random_range(0..individual.routes[r1].picks.len() as u64) as usize;
    let p2 = rng.random_range(0..individual.routes[r2].picks.len() as u64) as usize;

    if r1 == r2 {
        individual.routes[r1].picks.swap(p1, p2);
    } else {
        let v1 = individual.routes[r1].picks[p1];
        let v2 = individual.routes[r2].picks[p2];
        individual.routes[r1].picks[p1] = v2;
        individual.routes[r2].picks[p2] = v1;
    }
}

fn mutate_move(ctx: &Context, individual: &mut Individual, rng: &mut StdRng) {
    let candidates = nonempty_route_indices(individual);
    if candidates.is_empty() || individual.routes.len() < 2 {
        debug!("mutate_move: fewer than two routes available, leaving individual unchanged");
        return;
    }
    let src = candidates[rng.random_range(0..candidates.len() as u64) as usize];
    let dst = rng.random_range(0..individual.routes.len() as u64) as usize;
    if src == dst {
        return;
    }

    let pos = rng.random_range(0..individual.routes[src].picks.len() as u64) as usize;
    let node = individual.routes[src].picks[pos];
    let moved_items = ctx.orders[node - 1].items;
    let dst_items = ctx.route_items(&individual.routes[dst].picks);
    if dst_items + moved_items > ctx.couriers[dst].max_items {
        debug!("mutate_move: destination route has no capacity for the moved order, leaving individual unchanged");
        return;
    }

    individual.routes[src].picks.remove(pos);
    individual.routes[dst].picks.push(node);
}

fn mutate_reverse_segment(individual: &mut Individual, rng: &mut StdRng) {
    let candidates: Vec<usize> = individual
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.picks.len() >= 2)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        debug!("mutate_reverse_segment: no route with 2+ picks, leaving individual unchanged");
        return;
    }
    let r = candidates[rng.random_range(0..candidates.len() as u64) as usize];
    let len = individual.routes[r].picks.len();
    let start = rng.random_range(0..len as u64) as usize;
    let max_span = len - start;
    if max_span < 2 {
        return;
    }
    let span = rng.random_range(2..=max_span as u64) as usize;
    individual.routes[r].picks[start..start + span].reverse();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourierId, DepotId, Location, OrderId};

    fn depot() -> Depot {
        Depot::new(DepotId::from("d1"), "Depot", Location::new(0.0, 0.0, None).unwrap()).unwrap()
    }

    fn courier(id: &str, max_items: u32, max_weight: f64, max_km: f64) -> Courier {
        Courier::new(CourierId::from(id), "C", DepotId::from("d1"), max_items, max_weight, max_km).unwrap()
    }

    fn order_at(id: &str, lat: f64, lng: f64, items: u32, weight: f64) -> Order {
        Order::new_pending(OrderId::from(id), "Cust", None, Location::new(lat, lng, None).unwrap(), items, weight)
            .unwrap()
    }

    fn fast_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_generations(15)
            .with_timeout_s(5)
            .with_seed(42)
    }

    #[test]
    fn finds_a_feasible_assignment_for_easy_instance() {
        let depot = depot();
        let couriers = vec![courier("c1", 10, 50.0, 50.0), courier("c2", 10, 50.0, 50.0)];
        let orders = vec![
            order_at("o1", 0.01, 0.0, 3, 5.0),
            order_at("o2", 0.02, 0.0, 3, 5.0),
            order_at("o3", 0.0, 0.01, 3, 5.0),
            order_at("o4", 0.0, 0.02, 3, 5.0),
        ];
        let refs: Vec<&Order> = orders.iter().collect();
        let outcome = build(&depot, &refs, &couriers, &fast_config(), &MatrixBackend::Haversine);

        let assigned: usize = outcome.routes.iter().map(|r| r.points.len()).sum();
        assert_eq!(assigned + outcome.unassigned.len(), 4);
        for route in &outcome.routes {
            assert!(route.total_items <= 10);
        }
    }

    #[test]
    fn distance_infeasible_second_order_is_penalized_but_may_be_unassigned() {
        let depot = depot();
        let couriers = vec![courier("c1", 10, 100.0, 1.0)];
        let orders = vec![order_at("o1", 0.01, 0.0, 1, 1.0), order_at("o2", 0.0, 0.01, 1, 1.0)];
        let refs: Vec<&Order> = orders.iter().collect();
        let outcome = build(&depot, &refs, &couriers, &fast_config(), &MatrixBackend::Haversine);
        let assigned: usize = outcome.routes.iter().map(|r| r.points.len()).sum();
        assert!(assigned <= 2);
        assert_eq!(assigned + outcome.unassigned.len(), 2);
    }

    #[test]
    fn no_couriers_leaves_everything_unassigned() {
        let depot = depot();
        let orders = vec![order_at("o1", 0.01, 0.0, 1, 1.0)];
        let refs: Vec<&Order> = orders.iter().collect();
        let outcome = build(&depot, &refs, &[], &fast_config(), &MatrixBackend::Haversine);
        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.unassigned, vec![OrderId::from("o1")]);
    }

    #[test]
    fn same_seed_yields_identical_routes() {
        let depot = depot();
        let couriers = vec![courier("c1", 10, 50.0, 50.0), courier("c2", 10, 50.0, 50.0)];
        let orders = vec![
            order_at("o1", 0.01, 0.0, 3, 5.0),
            order_at("o2", 0.02, 0.0, 3, 5.0),
            order_at("o3", 0.0, 0.01, 3, 5.0),
        ];
        let refs: Vec<&Order> = orders.iter().collect();
        let config = fast_config();
        let first = build(&depot, &refs, &couriers, &config, &MatrixBackend::Haversine);
        let second = build(&depot, &refs, &couriers, &config, &MatrixBackend::Haversine);

        let first_ids: Vec<Vec<String>> = first
            .routes
            .iter()
            .map(|r| r.points.iter().map(|p| p.order_id.to_string()).collect())
            .collect();
        let second_ids: Vec<Vec<String>> = second
            .routes
            .iter()
            .map(|r| r.points.iter().map(|p| p.order_id.to_string()).collect())
            .collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn fitness_of_empty_individual_with_orders_is_infinite() {
        let depot = depot();
        let couriers = vec![courier("c1", 1, 1.0, 1.0)];
        let orders = vec![order_at("o1", 0.01, 0.0, 10, 1.0)];
        let refs: Vec<&Order> = orders.iter().collect();
        let locations: Vec<_> = std::iter::once(depot.location.clone())
            .chain(refs.iter().map(|o| o.location.clone()))
            .collect();
        let ctx = Context {
            orders: &refs,
            couriers: &couriers,
            distances: DistanceMatrix::from_locations(&locations),
        };
        let empty = Individual {
            routes: vec![GaRoute::default()],
            fitness: 0.0,
        };
        assert_eq!(ctx.fitness(&empty), f64::INFINITY);
    }
}
