//! Destination abstractions for the weighted ring.
//!
//! A destination is a named traffic target (for example a data-center code)
//! together with the weight it should receive relative to its peers.

use std::fmt;

/// Logical traffic target participating in the ring.
///
/// Value object: it is cloned into every ring slot it owns, so keep it
/// small and free of shared mutable state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Stable name of the target.
    pub id: String,
    /// Unitless weight relative to other destinations.
    pub weight: u32,
}

impl Destination {
    /// Construct a destination.
    pub fn new(id: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }

    /// Number of virtual nodes this destination owns at steady state.
    pub fn vnode_count(&self, replication_factor: u32) -> u32 {
        self.weight.saturating_mul(replication_factor)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.id, self.weight)
    }
}
