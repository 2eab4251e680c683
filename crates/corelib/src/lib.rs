//! Core library for weighted consistent-hash traffic splitting.
//!
//! This crate provides:
//! - Ring positions and pluggable hash functions
//! - Virtual node naming
//! - The sorted hash ring and its wrap-around lookup
//! - A thread-safe controller keeping virtual-node counts proportional to weight
//! - The routing facade with weight normalization and diff-based rebuilds

pub mod config;
pub mod controller;
pub mod error;
pub mod facade;
pub mod node;
pub mod partitioner;
pub mod rebalance;
pub mod ring;
pub mod token;
pub mod topology;
pub mod vnode;

pub use config::{RebuildMode, RingConfig};
pub use controller::WeightedRingController;
pub use error::{Error, Result};
pub use facade::RoutingFacade;
pub use node::Destination;
pub use partitioner::{HasherKind, Partitioner};
pub use rebalance::{RebuildSummary, RingChange, Weights};
pub use ring::{HashRing, Ring};
pub use token::Token;
pub use topology::RingTopology;
pub use vnode::VirtualNode;
