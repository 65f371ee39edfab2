//! Configuration for bonsai terrain sessions.
//!
//! Settings persist to disk as RON (`config.ron`), tolerate missing and
//! unknown fields, and can be overridden from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, PresentationConfig, ScatterConfig, SessionConfig, SpawnConfig,
    TerrainConfig, default_config_dir,
};
pub use error::ConfigError;
