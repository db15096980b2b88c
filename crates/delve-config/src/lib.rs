//! Configuration system for the delve carving engine.
//!
//! Holds the authored world settings, carver definitions and per-biome carve
//! chances. Persists to disk as RON, supports CLI overrides via clap, hot-reload
//! detection, and validation before anything reaches the generator.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BiomeDefinition, CarverDefinition, Config, DebugConfig, IntRange, WorldConfig,
};
pub use error::ConfigError;
