//! Virtual node naming.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each destination owns `replication_factor × weight` virtual nodes. A
//! virtual node is never stored as a record of its own: it is the ring
//! position produced by hashing a name derived from the destination
//! identifier and a replica index, mapped back to the destination.
//!
//! The name depends on `(identifier, index)` only. Growing a destination
//! from weight 30 to 40 therefore adds exactly indices `30..40` and leaves
//! the positions of `0..30` where they were, which is what makes the
//! incremental rebuild move so few keys.

use crate::partitioner::Partitioner;
use crate::token::Token;

/// Separator between the identifier and the replica index.
pub const SEPARATOR: &str = "*-";

/// A virtual node on the hash ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: Token,
    /// Replica index within the owning destination.
    pub index: u32,
}

impl VirtualNode {
    /// Create the virtual node with replica `index` of destination `id`.
    ///
    /// # Example
    /// ```rust
    /// use corelib::partitioner::Crc32Partitioner;
    /// use corelib::VirtualNode;
    ///
    /// let a = VirtualNode::from_index(&Crc32Partitioner, "sh", 0);
    /// let b = VirtualNode::from_index(&Crc32Partitioner, "sh", 0);
    /// assert_eq!(a, b);
    /// ```
    pub fn from_index(partitioner: &dyn Partitioner, id: &str, index: u32) -> Self {
        let token = partitioner.position(vnode_key(id, index).as_bytes());
        Self { token, index }
    }
}

/// Hashed name of replica `index` of destination `id`.
pub fn vnode_key(id: &str, index: u32) -> String {
    format!("{id}{SEPARATOR}{index}")
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(token={}, index={})", self.token, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::Crc32Partitioner;

    #[test]
    fn test_vnode_key_format() {
        assert_eq!(vnode_key("sh", 0), "sh*-0");
        assert_eq!(vnode_key("bj", 42), "bj*-42");
    }

    #[test]
    fn test_vnode_from_index() {
        let vnode0 = VirtualNode::from_index(&Crc32Partitioner, "sh", 0);
        let vnode1 = VirtualNode::from_index(&Crc32Partitioner, "sh", 1);

        assert_ne!(vnode0.token, vnode1.token);
        assert_eq!(vnode0.index, 0);
        assert_eq!(vnode1.index, 1);
        assert_eq!(vnode0.token, Crc32Partitioner.position(b"sh*-0"));
    }

    #[test]
    fn test_identifiers_do_not_share_positions() {
        let sh = VirtualNode::from_index(&Crc32Partitioner, "sh", 3);
        let bj = VirtualNode::from_index(&Crc32Partitioner, "bj", 3);
        assert_ne!(sh.token, bj.token);
    }
}
