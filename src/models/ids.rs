//! Opaque entity identifiers.
//!
//! Depot, courier, and order ids are newtype wrappers around `String` rather
//! than array indices: they are never reinterpreted as coordinates or as
//! positions in a distance matrix. Internal array positions used during a
//! call (distance-matrix rows, CP solver node indices) are a derived,
//! call-scoped indexing layer built on top of these ids, not a replacement
//! for them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(DepotId, "Opaque identifier for a [`Depot`](crate::models::Depot).");
opaque_id!(CourierId, "Opaque identifier for a [`Courier`](crate::models::Courier).");
opaque_id!(OrderId, "Opaque identifier for an [`Order`](crate::models::Order).");
opaque_id!(RouteId, "Opaque identifier for a [`Route`](crate::models::Route).");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(DepotId::from("d1"), DepotId::new("d1".to_string()));
        assert_ne!(DepotId::from("d1"), DepotId::from("d2"));
    }

    #[test]
    fn distinct_id_types_do_not_mix() {
        // This is a compile-time property; the test documents the intent.
        let depot = DepotId::from("x");
        let courier = CourierId::from("x");
        assert_eq!(depot.as_str(), courier.as_str());
    }

    #[test]
    fn display_matches_inner_string() {
        assert_eq!(OrderId::from("order-42").to_string(), "order-42");
    }
}
