//! Command-line argument parsing shared by starmesh binaries.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Catalog command-line arguments.
///
/// CLI values override settings loaded from `config.ron`. Binaries embed this
/// with `#[command(flatten)]`.
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Directory holding the catalog files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Sky mesh level.
    #[arg(long)]
    pub mesh_level: Option<u8>,

    /// Faintest magnitude considered by queries.
    #[arg(long)]
    pub magnitude_limit: Option<f32>,

    /// Julian year the index is first built for.
    #[arg(long)]
    pub reference_epoch: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.data_dir {
            self.data.data_dir = dir.clone();
        }
        if let Some(level) = args.mesh_level {
            self.mesh.level = level;
        }
        if let Some(mag) = args.magnitude_limit {
            self.query.magnitude_limit = mag;
        }
        if let Some(year) = args.reference_epoch {
            self.index.reference_epoch_year = year;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        catalog: CliArgs,
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            data_dir: Some(PathBuf::from("/tmp/stars")),
            mesh_level: Some(5),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.data.data_dir, PathBuf::from("/tmp/stars"));
        assert_eq!(config.mesh.level, 5);
        // Non-overridden fields retain defaults
        assert_eq!(config.query.magnitude_limit, 8.0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let cli = TestCli::parse_from([
            "starmesh",
            "--magnitude-limit",
            "6.5",
            "--reference-epoch",
            "2100",
            "--log-level",
            "debug",
        ]);
        let mut config = Config::default();
        config.apply_cli_overrides(&cli.catalog);
        assert_eq!(config.query.magnitude_limit, 6.5);
        assert_eq!(config.index.reference_epoch_year, 2100.0);
        assert_eq!(config.debug.log_level, "debug");
    }
}
