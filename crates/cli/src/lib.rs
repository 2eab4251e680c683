//! CLI tool for weighted traffic-splitting rings.
//!
//! Provides commands for:
//! - Routing keys against a weight configuration
//! - Inspecting per-destination virtual-node counts and keyspace shares
//! - Simulating a rebuild and measuring how many keys move

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
