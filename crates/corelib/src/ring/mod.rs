//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding the destination responsible for a key.

pub mod ring;

pub use ring::HashRing;

/// Alias for the main ring type (used by lib.rs).
pub type Ring = HashRing;
