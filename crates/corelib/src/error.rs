//! Error types for the core library.

use thiserror::Error;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Full registration of a destination that is already on the ring.
    #[error("destination `{0}` is already registered")]
    DuplicateRegistration(String),
    /// Range or removal operation on a destination that was never registered.
    #[error("destination `{0}` is not registered")]
    UnknownDestination(String),
    /// Lookup on a ring with no virtual nodes.
    #[error("ring has no destinations")]
    EmptyRing,
    /// Weight map whose weights sum to zero.
    #[error("weight map has no positive weight")]
    NoWeight,
    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}
