//! Core partitioner trait definitions.

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead. The same key must
/// yield the same token in every process, so implementations may not seed
/// from process-local randomness.
pub trait Partitioner: Send + Sync + 'static {
    /// Converts a key into a ring position.
    fn position(&self, key: &[u8]) -> Token;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
