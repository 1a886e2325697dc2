//! Depot entity.

use super::ids::DepotId;
use super::location::Location;
use serde::{Deserialize, Serialize};

/// Fixed origin/return point; every courier is anchored to exactly one depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: DepotId,
    pub name: String,
    pub location: Location,
}

impl Depot {
    /// Creates a depot, returning `None` if the name is empty.
    ///
    /// Uniqueness of `name` across a depot list is a collaborator-level
    /// invariant (§3); this constructor only enforces the per-instance shape.
    pub fn new(id: DepotId, name: impl Into<String>, location: Location) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return None;
        }
        Some(Self { id, name, location })
    }
}
