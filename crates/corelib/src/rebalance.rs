//! Weight normalization and diff planning for incremental rebuilds.
//!
//! A rebuild never starts from an empty ring. Instead the new weight map is
//! compared with the one currently applied and turned into a list of
//! `RingChange`s, each touching a single destination. Shrinking or growing
//! a destination only adds or removes the replica indices between its old
//! and new weight, so every other virtual node stays where it is.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::node::Destination;

/// Scale every weight map is normalized to.
pub const NORMALIZED_TOTAL: u64 = 100;

/// Normalized weights keyed by destination identifier.
///
/// Ordered so that plans, logs and collision resolution do not depend on
/// hash-map iteration order.
pub type Weights = BTreeMap<String, u32>;

/// Convert raw weights to the `0..=100` scale.
///
/// Each weight becomes `weight × 100 / sum`, truncated. The normalized total
/// may fall short of 100 by up to one unit per destination. Destinations
/// whose normalized weight is zero are dropped; a repeated identifier keeps
/// its last weight.
///
/// # Errors
/// `Error::NoWeight` if the raw weights sum to zero (including an empty map).
pub fn normalize<K: Into<String>>(raw: impl IntoIterator<Item = (K, u32)>) -> Result<Weights> {
    let raw: BTreeMap<String, u32> = raw.into_iter().map(|(k, w)| (k.into(), w)).collect();
    let sum: u64 = raw.values().map(|w| u64::from(*w)).sum();
    if sum == 0 {
        return Err(Error::NoWeight);
    }

    Ok(raw
        .into_iter()
        .filter_map(|(id, w)| {
            let scaled = (u64::from(w) * NORMALIZED_TOTAL / sum) as u32;
            (scaled > 0).then_some((id, scaled))
        })
        .collect())
}

/// One controller call of a rebuild plan.
///
/// Weights are in normalized units; the controller multiplies them by the
/// replication factor to get replica indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingChange {
    /// Destination absent from the applied map: register all of it.
    Register(Destination),
    /// Add replica indices for weights `from..destination.weight`.
    Grow { destination: Destination, from: u32 },
    /// Remove replica indices for weights `destination.weight..from`.
    Shrink { destination: Destination, from: u32 },
    /// Destination absent from the new map: remove all of it.
    /// Carries the previously applied weight.
    Deregister(Destination),
}

/// Compute the minimal change set turning `applied` into `target`.
///
/// Destinations present in both maps with equal weight produce nothing, so
/// rebuilding with the applied map yields an empty plan.
pub fn plan_rebuild(applied: &Weights, target: &Weights) -> Vec<RingChange> {
    let mut plan = Vec::new();

    for (id, &new) in target {
        match applied.get(id) {
            Some(&old) if new < old => plan.push(RingChange::Shrink {
                destination: Destination::new(id.clone(), new),
                from: old,
            }),
            Some(&old) if new > old => plan.push(RingChange::Grow {
                destination: Destination::new(id.clone(), new),
                from: old,
            }),
            Some(_) => {}
            None => plan.push(RingChange::Register(Destination::new(id.clone(), new))),
        }
    }

    for (id, &old) in applied {
        if !target.contains_key(id) {
            plan.push(RingChange::Deregister(Destination::new(id.clone(), old)));
        }
    }

    plan
}

/// Outcome of applying a rebuild plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub registered: usize,
    pub grown: usize,
    pub shrunk: usize,
    pub deregistered: usize,
    /// Changes the controller refused (duplicate or unknown destination).
    pub failed: usize,
}

impl RebuildSummary {
    /// Number of changes that were applied.
    pub fn applied(&self) -> usize {
        self.registered + self.grown + self.shrunk + self.deregistered
    }

    /// True if the ring was not touched.
    pub fn is_noop(&self) -> bool {
        self.applied() == 0 && self.failed == 0
    }

    pub(crate) fn record(&mut self, change: &RingChange, ok: bool) {
        if !ok {
            self.failed += 1;
            return;
        }
        match change {
            RingChange::Register(_) => self.registered += 1,
            RingChange::Grow { .. } => self.grown += 1,
            RingChange::Shrink { .. } => self.shrunk += 1,
            RingChange::Deregister(_) => self.deregistered += 1,
        }
    }
}
