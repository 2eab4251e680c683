//! Ring configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partitioner::HasherKind;

/// Default virtual nodes per unit of normalized weight.
pub const DEFAULT_REPLICATION_FACTOR: u32 = 1;

/// How `RoutingFacade::rebuild` applies a multi-destination change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildMode {
    /// One locked controller call per affected destination. Concurrent
    /// lookups may see a partially applied rebuild.
    #[default]
    PerDestination,
    /// The whole change set under a single write lock. Lookups block for
    /// the duration but never observe a half-applied configuration.
    Atomic,
}

/// Configuration shared by the controller and the facade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingConfig {
    /// Virtual nodes per unit of normalized weight.
    pub replication_factor: u32,
    /// Hash used for both virtual nodes and request keys.
    pub hasher: HasherKind,
    pub rebuild_mode: RebuildMode,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            hasher: HasherKind::default(),
            rebuild_mode: RebuildMode::default(),
        }
    }
}

impl RingConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RingConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_replication_factor(mut self, replication_factor: u32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    pub fn with_hasher(mut self, hasher: HasherKind) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_rebuild_mode(mut self, rebuild_mode: RebuildMode) -> Self {
        self.rebuild_mode = rebuild_mode;
        self
    }

    /// Reject configurations the ring cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(Error::Config("replication_factor must be at least 1".into()));
        }
        Ok(())
    }
}
