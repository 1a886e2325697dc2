//! Domain model types for the MD-CVRP delivery core.
//!
//! Provides the entities consumed and produced by the optimization pipeline:
//! depots, couriers, pending orders, and the routes proposed for them. All
//! entities are read-only snapshots handed in by the persistence
//! collaborator; the core never mutates them in place (§3 "Lifecycle").

mod courier;
mod depot;
mod ids;
mod location;
mod order;
mod route;

pub use courier::Courier;
pub use depot::Depot;
pub use ids::{CourierId, DepotId, OrderId, RouteId};
pub use location::Location;
pub use order::{Order, OrderStatus};
pub use route::{Route, RoutePoint};
