//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "bonsai-terrain";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Height synthesis and layer blending.
    pub terrain: TerrainConfig,
    /// Sizes and offsets of the working and world terrains.
    pub presentation: PresentationConfig,
    /// Deposit scattering.
    pub scatter: ScatterConfig,
    /// Creature spawn-point search.
    pub spawn: SpawnConfig,
    /// Demo session settings.
    pub session: SessionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Noise offsets identifying the terrain. `[100, 100]` gives a good island.
    pub seed: [i32; 2],
    /// Replace the seed with a random pair when the session starts.
    pub randomize_seed: bool,
    /// Noise cells spanned by the grid.
    pub tile_scale: f32,
    /// Tallest hill, in template height units.
    pub max_hill_height: f32,
    /// Base elevation, in template height units.
    pub min_hill_height: f32,
    /// Rows left untouched at each edge.
    pub margin_x: usize,
    /// Columns left untouched at each edge.
    pub margin_y: usize,
    /// Height samples per side.
    pub height_resolution: usize,
    /// Layer weight cells per side.
    pub alpha_resolution: usize,
    /// Detail density cells per side.
    pub detail_resolution: usize,
    /// Size of the template the grids are generated on.
    pub template_size: [f32; 3],
    /// Scaled height under which grassland fades out.
    pub lowland_cutoff: f32,
    /// Scaled height above which rock appears.
    pub highland_cutoff: f32,
    /// Scaled height of the shoreline.
    pub waterline_cutoff: f32,
}

/// Extents and offsets of the two presented terrains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresentationConfig {
    pub working_size: [f32; 3],
    pub world_size: [f32; 3],
    /// Position of the working terrain's minimum corner.
    pub working_offset: [f32; 3],
    /// Position of the world terrain's minimum corner.
    pub world_offset: [f32; 3],
}

/// Deposit scattering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatterConfig {
    /// World elevation below which objects become aquatic.
    pub waterline: f32,
    /// World elevation below which the deep-water variant may be chosen.
    pub deep_water: f32,
    /// Chance (0.0 - 1.0) of the deep-water variant.
    pub deep_variant_chance: f32,
    /// Per-cell chance (0.0 - 1.0) of a detail decoration inside a stamp.
    pub detail_density: f32,
    /// Diameter of the disc small and medium deposits scatter in.
    pub scatter_radius: f32,
}

/// Spawn-point search configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    /// Proposals before giving up.
    pub max_attempts: u32,
    /// Radius of the search disc around the world terrain centre.
    pub radius: f32,
    /// World height of proposed points.
    pub altitude: f32,
    /// Gap required above the terrain surface.
    pub clearance: f32,
}

/// Demo session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of synthetic deposits to replay.
    pub deposits: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: [100, 100],
            randomize_seed: false,
            tile_scale: 4.0,
            max_hill_height: 300.0,
            min_hill_height: 0.0,
            margin_x: 0,
            margin_y: 0,
            height_resolution: 129,
            alpha_resolution: 128,
            detail_resolution: 128,
            template_size: [600.0, 300.0, 600.0],
            lowland_cutoff: 0.45,
            highland_cutoff: 1.15,
            waterline_cutoff: 0.35,
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            working_size: [3.0, 1.0, 3.0],
            world_size: [60.0, 20.0, 60.0],
            working_offset: [-1.5, -0.2, -1.5],
            world_offset: [-40.0, -7.0, 20.0],
        }
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            waterline: 3.3,
            deep_water: 2.0,
            deep_variant_chance: 0.5,
            detail_density: 0.1,
            scatter_radius: 0.2,
        }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_attempts: 250,
            radius: 15.0,
            altitude: -4.0,
            clearance: 0.5,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { deposits: 24 }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for this application, if the OS has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

// --- Load / Save / Reload ---

const CONFIG_FILE: &str = "config.ron";

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Load settings from `config_dir`, writing the defaults there first if
    /// no settings file exists yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default terrain settings to {}", path.display());
            return Ok(config);
        }
        let config = read_file(&path)?;
        log::info!("Loaded terrain settings from {}", path.display());
        Ok(config)
    }

    /// Write these settings to `config_dir` as pretty RON.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_error = |source| ConfigError::WriteError {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_error)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&path, serialized).map_err(write_error)
    }

    /// Re-read the settings file. `None` when it matches `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_file(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Terrain settings changed on disk");
        Ok(Some(fresh))
    }
}
