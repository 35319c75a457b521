//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Catalog file locations.
    pub data: DataConfig,
    /// Sky mesh settings.
    pub mesh: MeshConfig,
    /// Index maintenance settings.
    pub index: IndexConfig,
    /// Query settings.
    pub query: QueryConfig,
    /// Observer used for horizon coordinates.
    pub observer: ObserverConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Where catalog files live and which tiers to look for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding every catalog file.
    pub data_dir: PathBuf,
    /// Object records of the named-star catalog.
    pub object_file: String,
    /// Name records paired with `object_file`.
    pub name_file: String,
    /// Deep tiers, highest priority (brightest) first.
    pub deep_catalogs: Vec<DeepCatalogConfig>,
    /// Catalog-number offset index into the lowest-priority deep tier.
    pub offset_index_file: Option<String>,
}

/// One deep catalog tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeepCatalogConfig {
    /// Object-record file name, relative to `data_dir`.
    pub file: String,
    /// The tier joins nearest-object queries once the magnitude limit exceeds this.
    pub trigger_magnitude: f32,
    /// Mesh level the file is partitioned with; the main mesh level when unset.
    #[serde(default)]
    pub mesh_level: Option<u8>,
}

/// Sky mesh configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Subdivision level; the mesh has `8 * 4^level` trixels.
    pub level: u8,
}

/// Index maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Proper-motion bucket thresholds in mas/yr.
    pub motion_thresholds_mas_yr: Vec<f64>,
    /// Drift (arcminutes) an object at the lowest threshold may accumulate
    /// before a full rebuild is required.
    pub max_drift_arcmin: f64,
    /// Julian year the index is first built for.
    pub reference_epoch_year: f64,
}

/// Query configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// Faintest magnitude considered by queries (clamped to the catalog's faintest star).
    pub magnitude_limit: f32,
    /// Starting radius for nearest-object searches, in degrees.
    pub nearest_radius_deg: f64,
}

/// Observer location and sidereal time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObserverConfig {
    /// Geodetic latitude in degrees, north positive.
    pub latitude_deg: f64,
    /// Local sidereal time in degrees.
    pub local_sidereal_time_deg: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|d| d.join("starmesh"))
                .unwrap_or_else(|| PathBuf::from("data")),
            object_file: "namedstars.dat".to_string(),
            name_file: "starnames.dat".to_string(),
            deep_catalogs: vec![
                DeepCatalogConfig {
                    file: "unnamedstars.dat".to_string(),
                    trigger_magnitude: -5.0,
                    mesh_level: None,
                },
                DeepCatalogConfig {
                    file: "tycho2.dat".to_string(),
                    trigger_magnitude: 8.0,
                    mesh_level: Some(6),
                },
                DeepCatalogConfig {
                    file: "USNO-NOMAD-1e8.dat".to_string(),
                    trigger_magnitude: 11.0,
                    mesh_level: Some(6),
                },
            ],
            offset_index_file: Some("Henry-Draper.idx".to_string()),
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            motion_thresholds_mas_yr: vec![840.0, 304.0],
            max_drift_arcmin: 25.0,
            reference_epoch_year: 2000.0,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            magnitude_limit: 8.0,
            nearest_radius_deg: 1.0,
        }
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            latitude_deg: 51.4769,
            local_sidereal_time_deg: 0.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl DataConfig {
    /// Full path of the named-star object file.
    pub fn object_path(&self) -> PathBuf {
        self.data_dir.join(&self.object_file)
    }

    /// Full path of the named-star name file.
    pub fn name_path(&self) -> PathBuf {
        self.data_dir.join(&self.name_file)
    }

    /// Full path of a deep tier's object file.
    pub fn deep_catalog_path(&self, deep: &DeepCatalogConfig) -> PathBuf {
        self.data_dir.join(&deep.file)
    }

    /// Full path of the offset index, if one is configured.
    pub fn offset_index_path(&self) -> Option<PathBuf> {
        self.offset_index_file
            .as_ref()
            .map(|file| self.data_dir.join(file))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// The platform configuration directory, e.g. `~/.config/starmesh` on Linux.
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("starmesh"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read_file(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::Write {
            path: config_path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(write_error)?;
        log::debug!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Re-read `config.ron`: `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read_file(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("level: 3"));
        assert!(ron_str.contains("namedstars.dat"));
    }

    #[test]
    fn test_default_thresholds_descend() {
        let index = IndexConfig::default();
        assert_eq!(index.motion_thresholds_mas_yr, vec![840.0, 304.0]);
        assert_eq!(index.reference_epoch_year, 2000.0);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(mesh: (level: 5), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.mesh.level, 5);
        assert_eq!(config.index, IndexConfig::default());
        assert_eq!(config.query, QueryConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_data_paths_join_data_dir() {
        let data = DataConfig {
            data_dir: PathBuf::from("/srv/sky"),
            ..DataConfig::default()
        };
        assert_eq!(data.object_path(), PathBuf::from("/srv/sky/namedstars.dat"));
        assert_eq!(data.name_path(), PathBuf::from("/srv/sky/starnames.dat"));
        assert_eq!(
            data.deep_catalog_path(&data.deep_catalogs[1]),
            PathBuf::from("/srv/sky/tycho2.dat")
        );
        assert_eq!(
            data.offset_index_path(),
            Some(PathBuf::from("/srv/sky/Henry-Draper.idx"))
        );
    }

    #[test]
    fn test_no_offset_index() {
        let data = DataConfig {
            offset_index_file: None,
            ..DataConfig::default()
        };
        assert!(data.offset_index_path().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.mesh.level = 4;
        config.query.magnitude_limit = 6.5;
        config.data.deep_catalogs.truncate(1);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.index.max_drift_arcmin = 10.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().index.max_drift_arcmin, 10.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
