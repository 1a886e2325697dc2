//! Distance matrices: the haversine closed form and the remote
//! road-network table-service backend (§4.1).

mod haversine;
mod matrix;
mod remote;

pub use haversine::{haversine_km, EARTH_RADIUS_KM};
pub use matrix::DistanceMatrix;
pub use remote::{fetch_matrix, RemoteMatrixResult, DEFAULT_TILE_TIMEOUT};

use crate::config::MatrixBackend;
use crate::models::Location;

/// Resolves a distance matrix for `locations` per the configured backend,
/// falling back to haversine transparently on any remote failure (§4.1, §7).
pub fn resolve_matrix(backend: &MatrixBackend, locations: &[Location]) -> DistanceMatrix {
    match backend {
        MatrixBackend::Haversine => DistanceMatrix::from_locations(locations),
        MatrixBackend::RoadNetwork {
            base_url,
            request_timeout,
        } => match fetch_matrix(base_url, locations, *request_timeout) {
            RemoteMatrixResult::Ok(matrix) => matrix,
            RemoteMatrixResult::Fallback => DistanceMatrix::from_locations(locations),
        },
    }
}
