//! Command-line configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use corelib::{HasherKind, RebuildMode, RingConfig};
use tracing::level_filters::LevelFilter;

use crate::commands::Command;

/// Weighted consistent-hash traffic splitter.
#[derive(Debug, Parser)]
#[command(name = "splitring", version)]
pub struct CliConfig {
    /// JSON ring configuration file. Flags below override its fields.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Virtual nodes per unit of normalized weight.
    #[arg(long, global = true)]
    pub replication_factor: Option<u32>,

    /// Hash function: xxh3, crc32 or sip.
    #[arg(long, global = true, value_parser = parse_hasher)]
    pub hasher: Option<HasherKind>,

    /// Apply rebuilds under a single lock.
    #[arg(long, global = true)]
    pub atomic: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Install logging, execute the subcommand and print its result.
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);
        let ring = self.ring_config()?;
        let result = self.command.execute(&ring)?;
        print!("{result}");
        Ok(())
    }

    /// Ring configuration from the config file, if any, and flags.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let mut ring = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                RingConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
            }
            None => RingConfig::default(),
        };

        if let Some(rf) = self.replication_factor {
            ring.replication_factor = rf;
        }
        if let Some(hasher) = self.hasher {
            ring.hasher = hasher;
        }
        if self.atomic {
            ring.rebuild_mode = RebuildMode::Atomic;
        }
        ring.validate()?;
        Ok(ring)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_hasher(s: &str) -> Result<HasherKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "xxh3" => Ok(HasherKind::Xxh3),
        "crc32" => Ok(HasherKind::Crc32),
        "sip" => Ok(HasherKind::Sip),
        other => Err(format!("unknown hasher `{other}` (expected xxh3, crc32 or sip)")),
    }
}
