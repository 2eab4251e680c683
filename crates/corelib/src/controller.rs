//! Weighted ring controller.
//!
//! Owns a `HashRing` together with the set of registered destinations and
//! keeps each destination's virtual-node count proportional to its weight.
//!
//! # Concurrency Model
//!
//! All ring state sits behind one `parking_lot::RwLock`. Every mutation
//! holds the write guard for its whole duration; `lookup`/`route` hold the
//! read guard, so any number of lookups run concurrently while no mutation
//! is in progress.
//!
//! # Registration
//!
//! For every destination the controller records which replica indices it
//! currently owns on the ring, and at which token. A destination is
//! registered exactly while it owns at least one slot. Range removals that
//! take away its last replica, and collisions that overwrite its last slot,
//! both deregister it.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::RebuildMode;
use crate::error::{Error, Result};
use crate::node::Destination;
use crate::partitioner::Partitioner;
use crate::rebalance::{RebuildSummary, RingChange};
use crate::ring::HashRing;
use crate::token::Token;
use crate::topology::RingTopology;
use crate::vnode::VirtualNode;

/// Replica index -> ring slot, for the replicas a destination still owns.
type Placements = BTreeMap<u32, Token>;

/// Ring plus registration bookkeeping, guarded as a unit.
#[derive(Debug, Default)]
struct RingState {
    ring: HashRing,
    /// Identifier -> owned replicas. Never holds an empty entry.
    registered: HashMap<String, Placements>,
}

impl RingState {
    fn register_full(
        &mut self,
        partitioner: &dyn Partitioner,
        replication_factor: u32,
        dest: &Destination,
    ) -> Result<()> {
        if self.registered.contains_key(&dest.id) {
            return Err(Error::DuplicateRegistration(dest.id.clone()));
        }
        let count = dest.vnode_count(replication_factor);
        if count == 0 {
            return Err(Error::NoWeight);
        }

        self.insert_indices(partitioner, dest, 0..count);
        debug!(id = %dest.id, weight = dest.weight, vnodes = count, "registered destination");
        Ok(())
    }

    fn register_range(
        &mut self,
        partitioner: &dyn Partitioner,
        dest: &Destination,
        indices: Range<u32>,
    ) -> Result<()> {
        if !self.registered.contains_key(&dest.id) {
            return Err(Error::UnknownDestination(dest.id.clone()));
        }

        debug!(id = %dest.id, lo = indices.start, hi = indices.end, "growing destination");
        self.insert_indices(partitioner, dest, indices);
        Ok(())
    }

    /// Removes every replica `dest` owns, whatever its current weight.
    fn deregister_full(&mut self, dest: &Destination) -> Result<()> {
        let Some(owned) = self.registered.remove(&dest.id) else {
            return Err(Error::UnknownDestination(dest.id.clone()));
        };

        for token in owned.values() {
            self.ring.remove(*token);
        }
        debug!(id = %dest.id, vnodes = owned.len(), "deregistered destination");
        Ok(())
    }

    fn deregister_range(&mut self, dest: &Destination, indices: Range<u32>) -> Result<()> {
        let Some(owned) = self.registered.get_mut(&dest.id) else {
            return Err(Error::UnknownDestination(dest.id.clone()));
        };

        debug!(id = %dest.id, lo = indices.start, hi = indices.end, "shrinking destination");
        let doomed: Vec<u32> = owned.range(indices).map(|(index, _)| *index).collect();
        for index in doomed {
            if let Some(token) = owned.remove(&index) {
                self.ring.remove(token);
            }
        }

        if owned.is_empty() {
            self.registered.remove(&dest.id);
            debug!(id = %dest.id, "destination has no virtual nodes left, deregistered");
        }
        Ok(())
    }

    fn insert_indices(
        &mut self,
        partitioner: &dyn Partitioner,
        dest: &Destination,
        indices: Range<u32>,
    ) {
        for index in indices {
            let vnode = VirtualNode::from_index(partitioner, &dest.id, index);
            if let Some(prev) = self.ring.insert(vnode.token, dest.clone()) {
                if prev.id != dest.id {
                    warn!(
                        token = %vnode.token,
                        from = %prev.id,
                        to = %dest.id,
                        "virtual node collision, slot overwritten"
                    );
                }
                self.release(&prev.id, vnode.token);
            }
            self.registered
                .entry(dest.id.clone())
                .or_default()
                .insert(index, vnode.token);
        }
    }

    /// Forget that `id` owns `token` after the slot was overwritten.
    fn release(&mut self, id: &str, token: Token) {
        let Some(owned) = self.registered.get_mut(id) else {
            return;
        };
        owned.retain(|_, t| *t != token);
        if owned.is_empty() {
            self.registered.remove(id);
            debug!(%id, "last virtual node overwritten, deregistered");
        }
    }

    fn apply(
        &mut self,
        partitioner: &dyn Partitioner,
        replication_factor: u32,
        change: &RingChange,
    ) -> Result<()> {
        let rf = replication_factor;
        match change {
            RingChange::Register(dest) => self.register_full(partitioner, rf, dest),
            RingChange::Grow { destination, from } => self.register_range(
                partitioner,
                destination,
                from.saturating_mul(rf)..destination.vnode_count(rf),
            ),
            RingChange::Shrink { destination, from } => self.deregister_range(
                destination,
                destination.vnode_count(rf)..from.saturating_mul(rf),
            ),
            RingChange::Deregister(dest) => self.deregister_full(dest),
        }
    }
}

/// Thread-safe weighted consistent-hash ring.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use corelib::{Destination, WeightedRingController};
/// use corelib::partitioner::Xxh3Partitioner;
///
/// let controller = WeightedRingController::new(Arc::new(Xxh3Partitioner), 1);
/// assert!(controller.register_full(&Destination::new("sh", 70)));
/// assert!(!controller.register_full(&Destination::new("sh", 70)));
/// assert_eq!(controller.route(b"123").unwrap(), "sh");
/// ```
pub struct WeightedRingController {
    partitioner: Arc<dyn Partitioner>,
    replication_factor: u32,
    state: RwLock<RingState>,
}

impl WeightedRingController {
    /// Create an empty controller.
    pub fn new(partitioner: Arc<dyn Partitioner>, replication_factor: u32) -> Self {
        Self {
            partitioner,
            replication_factor,
            state: RwLock::new(RingState::default()),
        }
    }

    pub fn replication_factor(&self) -> u32 {
        self.replication_factor
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Place all `replication_factor × weight` virtual nodes of `dest`.
    ///
    /// Returns `false` without touching the ring if `dest` is already
    /// registered or has no weight.
    pub fn register_full(&self, dest: &Destination) -> bool {
        let mut state = self.state.write();
        outcome(state.register_full(self.partitioner.as_ref(), self.replication_factor, dest))
    }

    /// Place replica indices `lo..hi` of an already registered destination.
    ///
    /// Returns `false` if `dest` is not registered.
    pub fn register_range(&self, dest: &Destination, lo: u32, hi: u32) -> bool {
        let mut state = self.state.write();
        outcome(state.register_range(self.partitioner.as_ref(), dest, lo..hi))
    }

    /// Remove every virtual node of `dest` and deregister it.
    ///
    /// Returns `false` if `dest` is not registered.
    pub fn deregister_full(&self, dest: &Destination) -> bool {
        let mut state = self.state.write();
        outcome(state.deregister_full(dest))
    }

    /// Remove replica indices `lo..hi` of a registered destination.
    ///
    /// Deregisters `dest` once it owns no virtual node. Returns `false` if
    /// `dest` is not registered.
    pub fn deregister_range(&self, dest: &Destination, lo: u32, hi: u32) -> bool {
        let mut state = self.state.write();
        outcome(state.deregister_range(dest, lo..hi))
    }

    /// Apply a rebuild plan.
    ///
    /// With `RebuildMode::PerDestination` each change takes the write lock on
    /// its own; with `RebuildMode::Atomic` the lock is held across the plan.
    pub fn apply(&self, plan: &[RingChange], mode: RebuildMode) -> RebuildSummary {
        let partitioner = self.partitioner.as_ref();
        let mut summary = RebuildSummary::default();
        match mode {
            RebuildMode::PerDestination => {
                for change in plan {
                    let mut state = self.state.write();
                    let ok = outcome(state.apply(partitioner, self.replication_factor, change));
                    summary.record(change, ok);
                }
            }
            RebuildMode::Atomic => {
                let mut state = self.state.write();
                for change in plan {
                    let ok = outcome(state.apply(partitioner, self.replication_factor, change));
                    summary.record(change, ok);
                }
            }
        }
        summary
    }

    /// Destination owning the first position `>= token`, wrapping around.
    pub fn lookup(&self, token: Token) -> Result<Destination> {
        self.state.read().ring.lookup(token).cloned()
    }

    /// Identifier of the destination `key` routes to.
    pub fn route(&self, key: &[u8]) -> Result<String> {
        let token = self.partitioner.position(key);
        self.state.read().ring.lookup(token).map(|dest| dest.id.clone())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.state.read().registered.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.read().registered.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ascending ring positions.
    pub fn positions(&self) -> Vec<Token> {
        self.state.read().ring.positions()
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.state.read().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().ring.is_empty()
    }

    /// Virtual nodes currently on the ring per destination.
    pub fn vnode_counts(&self) -> BTreeMap<String, usize> {
        self.topology().vnodes
    }

    /// Per-destination virtual-node counts and keyspace shares.
    pub fn topology(&self) -> RingTopology {
        RingTopology::from_ring(&self.state.read().ring)
    }
}

impl std::fmt::Debug for WeightedRingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedRingController")
            .field("partitioner", &self.partitioner.name())
            .field("replication_factor", &self.replication_factor)
            .field("vnodes", &self.len())
            .finish()
    }
}

fn outcome(result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, "ring change refused");
            false
        }
    }
}
