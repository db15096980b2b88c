//! Configuration structs with sensible defaults and RON persistence.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level carving configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World generation settings.
    pub world: WorldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Carver definitions, one per carver type.
    pub carvers: Vec<CarverDefinition>,
    /// Per-biome carve chances.
    pub biomes: Vec<BiomeDefinition>,
}

/// World generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed shared by every carver.
    pub seed: i64,
    /// How many chunks away a worm may start and still reach the carved chunk.
    pub carving_radius: u32,
    /// Half-width, in chunks, of the square the demo generates.
    pub view_radius: u32,
    /// Worker threads for chunk carving (0 = pick from CPU count).
    pub worker_threads: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// An inclusive integer range as authored in `config.ron`: `(min: 8, max: 10)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntRange {
    /// Lower bound (inclusive).
    pub min: i32,
    /// Upper bound (inclusive).
    pub max: i32,
}

impl IntRange {
    /// Creates a range covering `min..=max`.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Authored description of one carver type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CarverDefinition {
    /// Unique carver identifier; biomes reference carvers by this name.
    pub id: String,
    /// Vertical band worm origins are picked from.
    pub height: IntRange,
    /// Initial running radius, and its upper bound.
    pub radius: IntRange,
    /// Sampled path length; worms step half of this.
    pub length: IntRange,
    /// Per-axis scale for the initial direction.
    pub start: [f64; 3],
    /// Per-axis rotational drift in degrees, then radius drift.
    pub mutate: [f64; 4],
    /// Per-axis scale turning the running radius into an ellipsoid.
    pub radius_multiplier: [f64; 3],
    /// Voxels trimmed from the top of each carved ellipsoid.
    pub top_cut: i32,
    /// Voxels trimmed from the bottom of each carved ellipsoid.
    pub bottom_cut: i32,
    /// Length of one step.
    pub step: f64,
    /// Steps between direction re-plans.
    pub recalc: IntRange,
    /// Multiplier applied to the re-plan rotation only.
    pub recalc_magnitude: f64,
    /// Explicit seed salt. Derived from `id` when absent.
    pub seed_salt: Option<i64>,
}

/// Carve chances for one biome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BiomeDefinition {
    /// Biome name.
    pub name: String,
    /// Carver id -> chance in percent (0-100) that a chunk is carved.
    pub carvers: BTreeMap<String, u32>,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        let cave = CarverDefinition::default();
        let ravine = CarverDefinition {
            id: "ravine".to_string(),
            height: IntRange::new(20, 60),
            radius: IntRange::new(3, 5),
            length: IntRange::new(120, 180),
            start: [1.0, 0.1, 1.0],
            mutate: [2.0, 6.0, 2.0, 0.8],
            radius_multiplier: [1.0, 4.0, 1.0],
            top_cut: 2,
            bottom_cut: 1,
            ..CarverDefinition::default()
        };
        let biomes = vec![
            BiomeDefinition {
                name: "plains".to_string(),
                carvers: BTreeMap::from([(cave.id.clone(), 20), (ravine.id.clone(), 2)]),
            },
            BiomeDefinition {
                name: "mountains".to_string(),
                carvers: BTreeMap::from([(cave.id.clone(), 35), (ravine.id.clone(), 6)]),
            },
            BiomeDefinition {
                name: "ocean".to_string(),
                carvers: BTreeMap::new(),
            },
        ];
        Self {
            world: WorldConfig::default(),
            debug: DebugConfig::default(),
            carvers: vec![cave, ravine],
            biomes,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            carving_radius: 4,
            view_radius: 8,
            worker_threads: 0,
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

impl Default for CarverDefinition {
    fn default() -> Self {
        Self {
            id: "cave".to_string(),
            height: IntRange::new(8, 56),
            radius: IntRange::new(2, 4),
            length: IntRange::new(80, 140),
            start: [1.0, 0.3, 1.0],
            mutate: [3.0, 8.0, 3.0, 0.6],
            radius_multiplier: [1.0, 0.8, 1.0],
            top_cut: 0,
            bottom_cut: 0,
            step: 2.0,
            recalc: IntRange::new(8, 10),
            recalc_magnitude: 3.0,
            seed_salt: None,
        }
    }
}

// --- Validation ---

impl CarverDefinition {
    /// Checks every range is ordered and the radius can reach 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("height", self.height),
            ("radius", self.radius),
            ("length", self.length),
            ("recalc", self.recalc),
        ];
        for (field, range) in ranges {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    carver: self.id.clone(),
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if self.radius.max < 1 {
            return Err(ConfigError::RadiusTooSmall {
                carver: self.id.clone(),
                max: self.radius.max,
            });
        }
        Ok(())
    }
}

impl Config {
    /// Validates carver ranges, carver id uniqueness, and biome references.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for carver in &self.carvers {
            if !ids.insert(carver.id.as_str()) {
                return Err(ConfigError::DuplicateCarver(carver.id.clone()));
            }
            carver.validate()?;
        }

        for biome in &self.biomes {
            for (carver, &chance) in &biome.carvers {
                if !ids.contains(carver.as_str()) {
                    return Err(ConfigError::UnknownCarver {
                        biome: biome.name.clone(),
                        carver: carver.clone(),
                    });
                }
                if chance > 100 {
                    return Err(ConfigError::ChanceOutOfRange {
                        biome: biome.name.clone(),
                        carver: carver.clone(),
                        chance,
                    });
                }
            }
        }
        Ok(())
    }

    /// Looks up a carver definition by id.
    pub fn carver(&self, id: &str) -> Option<&CarverDefinition> {
        self.carvers.iter().find(|c| c.id == id)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// Loaded configs are validated before being returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }
}
