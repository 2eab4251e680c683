//! Ring positions.
//!
//! A token is a point on the fixed-size circular keyspace `[0, 2^32)`. Both
//! request keys and virtual nodes are hashed to tokens; a key belongs to the
//! first virtual node at or after its token, wrapping past `u32::MAX`.

use std::fmt;

/// Position on the 32-bit hash ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Token(pub u32);

impl Token {
    /// Start of the ring.
    pub const MIN: Token = Token(0);
    /// Last position before the ring wraps.
    pub const MAX: Token = Token(u32::MAX);

    /// Number of positions on the ring.
    pub const SPACE: u64 = 1 << 32;

    /// Clockwise distance from `self` to `other`.
    ///
    /// Returned as `u64` so that a full turn (`SPACE`) stays representable.
    /// Equal tokens are zero apart.
    pub fn distance_to(&self, other: &Self) -> u64 {
        if other.0 >= self.0 {
            u64::from(other.0 - self.0)
        } else {
            Self::SPACE - u64::from(self.0 - other.0)
        }
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
