//! Ring topology views.
//!
//! Read-only summaries over a ring: how many virtual nodes each destination
//! owns and what fraction of the keyspace falls to it. A key maps to the
//! first slot at or after its token, so each slot owns the arc from the
//! previous slot (exclusive) up to itself (inclusive).

use std::collections::BTreeMap;
use std::fmt;

use crate::ring::HashRing;
use crate::token::Token;

/// Snapshot of per-destination ring presence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingTopology {
    /// Virtual nodes per destination.
    pub vnodes: BTreeMap<String, usize>,
    /// Fraction of the keyspace (0.0..=1.0) routed to each destination.
    pub ownership: BTreeMap<String, f64>,
}

impl RingTopology {
    pub fn from_ring(ring: &HashRing) -> Self {
        let mut vnodes: BTreeMap<String, usize> = BTreeMap::new();
        let mut arcs: BTreeMap<String, u64> = BTreeMap::new();

        let Some((&last, _)) = ring.iter().last() else {
            return Self::default();
        };

        let mut prev = last;
        for (&token, dest) in ring.iter() {
            let arc = if ring.len() == 1 {
                Token::SPACE
            } else {
                prev.distance_to(&token)
            };
            *vnodes.entry(dest.id.clone()).or_default() += 1;
            *arcs.entry(dest.id.clone()).or_default() += arc;
            prev = token;
        }

        let ownership = arcs
            .into_iter()
            .map(|(id, arc)| (id, arc as f64 / Token::SPACE as f64))
            .collect();

        Self { vnodes, ownership }
    }

    /// Total virtual nodes on the ring.
    pub fn total_vnodes(&self) -> usize {
        self.vnodes.values().sum()
    }
}

impl fmt::Display for RingTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, count) in &self.vnodes {
            let share = self.ownership.get(id).copied().unwrap_or_default();
            writeln!(f, "{id:<16} vnodes={count:<6} share={:.2}%", share * 100.0)?;
        }
        Ok(())
    }
}
