//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys into tokens
//! that can be placed on the hash ring.

pub mod crc32;
pub mod sip;
pub mod traits;
pub mod xxh3;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crc32::Crc32Partitioner;
pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;

/// Hash function selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// XXH3-64 truncated to 32 bits.
    #[default]
    Xxh3,
    /// CRC-32/IEEE checksum. Yields the same positions as checksum-based
    /// deployments of the splitter.
    Crc32,
    /// SipHash-1-3 with zero keys, folded to 32 bits.
    Sip,
}

impl HasherKind {
    /// Instantiate the partitioner for this kind.
    pub fn partitioner(self) -> Arc<dyn Partitioner> {
        match self {
            HasherKind::Xxh3 => Arc::new(Xxh3Partitioner),
            HasherKind::Crc32 => Arc::new(Crc32Partitioner),
            HasherKind::Sip => Arc::new(SipPartitioner),
        }
    }
}
