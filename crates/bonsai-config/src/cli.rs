//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Bonsai terrain command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "bonsai", about = "Generate a bonsai terrain and replay deposits")]
pub struct CliArgs {
    /// First seed component.
    #[arg(long)]
    pub seed_x: Option<i32>,

    /// Second seed component.
    #[arg(long)]
    pub seed_y: Option<i32>,

    /// Pick a random seed pair at startup.
    #[arg(long)]
    pub randomize: Option<bool>,

    /// Number of synthetic deposits to replay.
    #[arg(long)]
    pub deposits: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a session snapshot to this file when done.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(x) = args.seed_x {
            self.terrain.seed[0] = x;
        }
        if let Some(y) = args.seed_y {
            self.terrain.seed[1] = y;
        }
        if let Some(randomize) = args.randomize {
            self.terrain.randomize_seed = randomize;
        }
        if let Some(n) = args.deposits {
            self.session.deposits = n;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
