//! Routing facade: the build/route/rebuild entry points.
//!
//! The facade is an ordinary value owned by the caller, typically created
//! at startup and shared with request handlers through an `Arc`. It keeps
//! the normalized weights the ring currently reflects so that `rebuild` can
//! turn a new configuration into an incremental change set.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::RingConfig;
use crate::controller::WeightedRingController;
use crate::error::Result;
use crate::node::Destination;
use crate::partitioner::Partitioner;
use crate::rebalance::{self, RebuildSummary, Weights};
use crate::topology::RingTopology;

/// Weighted traffic splitter.
///
/// # Example
///
/// ```rust
/// use corelib::{RingConfig, RoutingFacade};
///
/// let router = RoutingFacade::new(RingConfig::default()).unwrap();
/// router.build([("sh", 70), ("bj", 30)]).unwrap();
/// let center = router.route("app-123").unwrap();
/// assert!(center == "sh" || center == "bj");
///
/// let summary = router.rebuild([("sh", 60), ("bj", 30), ("wg", 10)]).unwrap();
/// assert_eq!(summary.shrunk, 1);
/// assert_eq!(summary.registered, 1);
/// ```
pub struct RoutingFacade {
    config: RingConfig,
    partitioner: Arc<dyn Partitioner>,
    controller: RwLock<Arc<WeightedRingController>>,
    /// Serializes build/rebuild and holds the weights the ring reflects.
    applied: Mutex<Weights>,
}

impl RoutingFacade {
    /// Create a facade with an empty ring using the configured hasher.
    pub fn new(config: RingConfig) -> Result<Self> {
        let partitioner = config.hasher.partitioner();
        Self::with_partitioner(config, partitioner)
    }

    /// Create a facade with an explicit partitioner, overriding
    /// `config.hasher`.
    pub fn with_partitioner(
        config: RingConfig,
        partitioner: Arc<dyn Partitioner>,
    ) -> Result<Self> {
        config.validate()?;
        let controller =
            WeightedRingController::new(Arc::clone(&partitioner), config.replication_factor);
        Ok(Self {
            config,
            partitioner,
            controller: RwLock::new(Arc::new(controller)),
            applied: Mutex::new(Weights::new()),
        })
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Replace the routing configuration.
    ///
    /// Raw weights are normalized to a 0–100 scale; destinations that
    /// normalize to zero are left off the ring. Any previous ring is
    /// discarded.
    ///
    /// # Errors
    /// `Error::NoWeight` if the weights sum to zero. The previous ring stays
    /// in place in that case.
    pub fn build<K: Into<String>>(
        &self,
        weights: impl IntoIterator<Item = (K, u32)>,
    ) -> Result<()> {
        let normalized = rebalance::normalize(weights)?;
        let mut applied = self.applied.lock();

        let controller = WeightedRingController::new(
            Arc::clone(&self.partitioner),
            self.config.replication_factor,
        );
        for (id, &weight) in &normalized {
            controller.register_full(&Destination::new(id.clone(), weight));
        }
        debug!(vnodes = ?controller.vnode_counts(), "ring built");

        *self.controller.write() = Arc::new(controller);
        info!(
            destinations = normalized.len(),
            weights = ?normalized,
            "routing configuration applied"
        );
        *applied = normalized;
        Ok(())
    }

    /// Destination identifier for `key`.
    ///
    /// # Errors
    /// `Error::EmptyRing` before a successful `build`.
    pub fn route(&self, key: &str) -> Result<String> {
        self.controller.read().route(key.as_bytes())
    }

    /// Move the ring to a new weight configuration with minimal churn.
    ///
    /// Weights are normalized exactly as in `build`, then diffed against
    /// the applied configuration: unchanged destinations are not touched,
    /// resized ones gain or lose only the replica indices between the old
    /// and new weight, new ones are registered and missing ones removed.
    /// How concurrent lookups observe a multi-destination change follows
    /// `RingConfig::rebuild_mode`.
    ///
    /// # Errors
    /// `Error::NoWeight` if the weights sum to zero; the ring is left as is.
    pub fn rebuild<K: Into<String>>(
        &self,
        weights: impl IntoIterator<Item = (K, u32)>,
    ) -> Result<RebuildSummary> {
        let normalized = rebalance::normalize(weights)?;
        let mut applied = self.applied.lock();

        let plan = rebalance::plan_rebuild(&applied, &normalized);
        let controller = self.controller.read().clone();
        let summary = controller.apply(&plan, self.config.rebuild_mode);

        debug!(vnodes = ?controller.vnode_counts(), "ring rebuilt");
        info!(
            registered = summary.registered,
            grown = summary.grown,
            shrunk = summary.shrunk,
            deregistered = summary.deregistered,
            failed = summary.failed,
            "routing configuration rebuilt"
        );
        *applied = normalized;
        Ok(summary)
    }

    /// Normalized weights the ring currently reflects.
    pub fn applied_weights(&self) -> Weights {
        self.applied.lock().clone()
    }

    /// Handle to the current controller, for diagnostics.
    pub fn controller(&self) -> Arc<WeightedRingController> {
        self.controller.read().clone()
    }

    pub fn topology(&self) -> RingTopology {
        self.controller.read().topology()
    }
}

impl std::fmt::Debug for RoutingFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingFacade")
            .field("config", &self.config)
            .field("applied", &*self.applied.lock())
            .finish()
    }
}
