//! Hash ring data structure.
//!
//! Holds `BTreeMap<Token, Destination>`: the key set is the ascending
//! sequence of ring positions, so there is no separate resort step after a
//! mutation.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::node::Destination;
use crate::token::Token;

/// Sorted map from ring position to the destination owning it.
///
/// Not synchronized; `WeightedRingController` wraps it in a lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashRing {
    slots: BTreeMap<Token, Destination>,
}

impl HashRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the slot at `token`.
    ///
    /// Collisions are not an error: the last writer wins and the displaced
    /// destination is returned.
    pub fn insert(&mut self, token: Token, destination: Destination) -> Option<Destination> {
        self.slots.insert(token, destination)
    }

    /// Delete the slot at `token`, if any.
    pub fn remove(&mut self, token: Token) -> Option<Destination> {
        self.slots.remove(&token)
    }

    /// Owner of the slot at exactly `token`.
    pub fn get(&self, token: Token) -> Option<&Destination> {
        self.slots.get(&token)
    }

    /// Destination owning the first position `>= token`, wrapping to the
    /// smallest position when `token` is past the last one.
    ///
    /// # Errors
    /// `Error::EmptyRing` if the ring has no slots.
    pub fn lookup(&self, token: Token) -> Result<&Destination> {
        self.slots
            .range(token..)
            .next()
            .or_else(|| self.slots.iter().next())
            .map(|(_, dest)| dest)
            .ok_or(Error::EmptyRing)
    }

    /// Ascending ring positions.
    pub fn positions(&self) -> Vec<Token> {
        self.slots.keys().copied().collect()
    }

    /// Slots in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, &Destination)> {
        self.slots.iter()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
