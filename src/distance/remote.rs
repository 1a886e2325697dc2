//! Remote road-network table-service backend (§4.1, §6 "Remote protocol").
//!
//! Any HTTP error, timeout, malformed payload, or shape mismatch is treated
//! as a [`RemoteMatrixResult::Fallback`] rather than surfaced to the caller,
//! per §7 "Remote matrix failure" and §9's "exceptions become explicit
//! result variants."

use super::matrix::DistanceMatrix;
use crate::models::Location;
use log::warn;
use serde::Deserialize;
use std::time::Duration;

/// Locations batched per request, and the tile edge length for larger N
/// (§4.1: "batches at most 100 locations per request ... tiles ... in
/// 100x100 sub-blocks").
const MAX_LOCATIONS_PER_REQUEST: usize = 100;

/// Sleep between tiles when a matrix must be fetched across multiple
/// requests (§4.1).
const INTER_TILE_SLEEP: Duration = Duration::from_millis(200);

/// Default per-tile HTTP timeout (§5 "Cancellation and timeouts").
pub const DEFAULT_TILE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    #[serde(default)]
    distances: Option<Vec<Vec<f64>>>,
}

/// Outcome of one remote-matrix attempt. `Fallback` carries no error detail
/// to the caller by design — the policy is "log and fall back transparently."
pub enum RemoteMatrixResult {
    Ok(DistanceMatrix),
    Fallback,
}

/// Fetches an N×N distance matrix from a road-network table service.
///
/// `locations` with `(0,0)` coordinates or otherwise unusable are treated as
/// invalid; the request is shrunk to the remaining usable points and the
/// corresponding matrix cells are zero-filled (§4.1 "Failure semantics").
pub fn fetch_matrix(base_url: &str, locations: &[Location], request_timeout: Duration) -> RemoteMatrixResult {
    let n = locations.len();
    if n == 0 {
        return RemoteMatrixResult::Ok(DistanceMatrix::new(0));
    }

    let usable: Vec<usize> = (0..n).filter(|&i| locations[i].is_usable()).collect();
    if usable.is_empty() {
        warn!("remote matrix: no usable locations, falling back to haversine");
        return RemoteMatrixResult::Fallback;
    }

    let client = match reqwest::blocking::Client::builder().timeout(request_timeout).build() {
        Ok(c) => c,
        Err(e) => {
            warn!("remote matrix: failed to build HTTP client: {e}");
            return RemoteMatrixResult::Fallback;
        }
    };

    let mut matrix = DistanceMatrix::new(n);

    let tiles = tile_indices(&usable, MAX_LOCATIONS_PER_REQUEST);
    for (tile_idx, (src_idx, dst_idx)) in tiles.iter().enumerate() {
        match fetch_tile(&client, base_url, locations, src_idx, dst_idx) {
            Some(tile) => {
                for (si, &src) in src_idx.iter().enumerate() {
                    for (di, &dst) in dst_idx.iter().enumerate() {
                        matrix.set(src, dst, tile[si][di] / 1000.0);
                    }
                }
            }
            None => {
                warn!("remote matrix: tile fetch failed, falling back to haversine for entire call");
                return RemoteMatrixResult::Fallback;
            }
        }

        if tile_idx + 1 < tiles.len() {
            std::thread::sleep(INTER_TILE_SLEEP);
        }
    }

    RemoteMatrixResult::Ok(matrix)
}

/// Splits `indices` into `ceil(n/tile_size)^2` (source-tile, destination-tile)
/// pairs covering the full cross product.
fn tile_indices(indices: &[usize], tile_size: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let chunks: Vec<Vec<usize>> = indices.chunks(tile_size).map(|c| c.to_vec()).collect();
    let mut tiles = Vec::with_capacity(chunks.len() * chunks.len());
    for src in &chunks {
        for dst in &chunks {
            tiles.push((src.clone(), dst.clone()));
        }
    }
    tiles
}

fn fetch_tile(
    client: &reqwest::blocking::Client,
    base_url: &str,
    locations: &[Location],
    src_idx: &[usize],
    dst_idx: &[usize],
) -> Option<Vec<Vec<f64>>> {
    let url = build_url(base_url, locations, src_idx, dst_idx);

    let response = client.get(&url).send().ok()?;
    if !response.status().is_success() {
        return None;
    }

    let body: TableResponse = response.json().ok()?;
    if body.code != "Ok" {
        return None;
    }
    let distances = body.distances?;
    if distances.len() != src_idx.len() || distances.iter().any(|row| row.len() != dst_idx.len()) {
        return None;
    }
    Some(distances)
}

/// Builds `{base}/{lng1,lat1;lng2,lat2;…}?sources=…&destinations=…` (§6).
fn build_url(base_url: &str, locations: &[Location], src_idx: &[usize], dst_idx: &[usize]) -> String {
    // Source and destination indices may overlap but the table service wants
    // one ordered coordinate list plus sources/destinations index sets.
    let mut all_idx: Vec<usize> = src_idx.to_vec();
    for &d in dst_idx {
        if !all_idx.contains(&d) {
            all_idx.push(d);
        }
    }

    let coords: Vec<String> = all_idx
        .iter()
        .map(|&i| format!("{},{}", locations[i].lng, locations[i].lat))
        .collect();

    let sources: Vec<String> = src_idx
        .iter()
        .map(|i| all_idx.iter().position(|x| x == i).unwrap().to_string())
        .collect();
    let destinations: Vec<String> = dst_idx
        .iter()
        .map(|i| all_idx.iter().position(|x| x == i).unwrap().to_string())
        .collect();

    format!(
        "{}/{}?sources={}&destinations={}",
        base_url.trim_end_matches('/'),
        coords.join(";"),
        sources.join(";"),
        destinations.join(";")
    )
}
