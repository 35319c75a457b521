//! Configuration system for starmesh.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DataConfig, DebugConfig, DeepCatalogConfig, IndexConfig, MeshConfig,
    ObserverConfig, QueryConfig,
};
pub use error::ConfigError;
