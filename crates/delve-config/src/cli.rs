//! Command-line argument parsing for the delve tools.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// delve command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "delve", about = "Worm-based cave and ravine carving")]
pub struct CliArgs {
    /// World seed.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Half-width of the generated chunk square.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Number of carving worker threads.
    #[arg(long)]
    pub threads: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Resolves the config directory: the `--config` flag, else the OS config dir.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("delve")))
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(radius) = args.radius {
            self.world.view_radius = radius;
        }
        if let Some(threads) = args.threads {
            self.world.worker_threads = threads;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
