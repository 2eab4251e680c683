//! Subcommands and their results.

use std::fmt;

use clap::{Args, Subcommand};
use corelib::{RebuildMode, RebuildSummary, RingConfig, RingTopology, RoutingFacade};

/// Weight map given as `id=weight` pairs, comma separated or repeated.
#[derive(Debug, Clone, Args)]
pub struct WeightArgs {
    /// Destination weights, e.g. `sh=70,bj=30`.
    #[arg(long, required = true, value_delimiter = ',', value_parser = parse_weight)]
    pub weights: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the destination of each key.
    Route {
        #[command(flatten)]
        weights: WeightArgs,
        /// Keys to route.
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print virtual-node counts and keyspace shares per destination.
    Inspect {
        #[command(flatten)]
        weights: WeightArgs,
    },
    /// Build with `--weights`, rebuild to `--to` and report churn.
    Rebuild {
        #[command(flatten)]
        weights: WeightArgs,
        /// Target weights, e.g. `sh=60,bj=30,wg=10`.
        #[arg(long, required = true, value_delimiter = ',', value_parser = parse_weight)]
        to: Vec<(String, u32)>,
        /// Number of synthetic keys used to measure movement.
        #[arg(long, default_value_t = 10_000)]
        samples: usize,
    },
}

/// Output of a subcommand.
#[derive(Debug)]
pub enum CommandResult {
    Routes(Vec<(String, String)>),
    Topology {
        hasher: &'static str,
        replication_factor: u32,
        rebuild_mode: RebuildMode,
        topology: RingTopology,
    },
    Rebuild {
        summary: RebuildSummary,
        topology: RingTopology,
        moved: usize,
        samples: usize,
    },
}

impl Command {
    pub fn execute(self, config: &RingConfig) -> anyhow::Result<CommandResult> {
        let router = RoutingFacade::new(config.clone())?;
        match self {
            Command::Route { weights, keys } => {
                router.build(weights.weights)?;
                let routes = keys
                    .into_iter()
                    .map(|key| {
                        let id = router.route(&key)?;
                        Ok((key, id))
                    })
                    .collect::<corelib::Result<Vec<_>>>()?;
                Ok(CommandResult::Routes(routes))
            }
            Command::Inspect { weights } => {
                router.build(weights.weights)?;
                let controller = router.controller();
                Ok(CommandResult::Topology {
                    hasher: controller.partitioner_name(),
                    replication_factor: controller.replication_factor(),
                    rebuild_mode: router.config().rebuild_mode,
                    topology: router.topology(),
                })
            }
            Command::Rebuild {
                weights,
                to,
                samples,
            } => {
                router.build(weights.weights)?;
                let keys: Vec<String> = (0..samples).map(|i| format!("sample-{i}")).collect();
                let before = keys
                    .iter()
                    .map(|k| router.route(k))
                    .collect::<corelib::Result<Vec<_>>>()?;

                let summary = router.rebuild(to)?;

                let mut moved = 0;
                for (key, old) in keys.iter().zip(&before) {
                    if router.route(key)? != *old {
                        moved += 1;
                    }
                }
                Ok(CommandResult::Rebuild {
                    summary,
                    topology: router.topology(),
                    moved,
                    samples,
                })
            }
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Routes(routes) => {
                for (key, id) in routes {
                    writeln!(f, "{key} -> {id}")?;
                }
                Ok(())
            }
            CommandResult::Topology {
                hasher,
                replication_factor,
                rebuild_mode,
                topology,
            } => {
                writeln!(
                    f,
                    "hasher={hasher} replication_factor={replication_factor} rebuild_mode={rebuild_mode:?} vnodes={}",
                    topology.total_vnodes()
                )?;
                write!(f, "{topology}")
            }
            CommandResult::Rebuild {
                summary,
                topology,
                moved,
                samples,
            } => {
                writeln!(
                    f,
                    "registered={} grown={} shrunk={} deregistered={} failed={}",
                    summary.registered, summary.grown, summary.shrunk, summary.deregistered, summary.failed
                )?;
                write!(f, "{topology}")?;
                let pct = if *samples == 0 {
                    0.0
                } else {
                    *moved as f64 * 100.0 / *samples as f64
                };
                writeln!(f, "moved {moved}/{samples} keys ({pct:.2}%)")
            }
        }
    }
}

fn parse_weight(s: &str) -> Result<(String, u32), String> {
    let (id, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `id=weight`, got `{s}`"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing destination id in `{s}`"));
    }
    let weight = weight
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid weight in `{s}`: {e}"))?;
    Ok((id.to_string(), weight))
}
