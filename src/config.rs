//! Configuration system for the reef simulation.
//!
//! Supports YAML configuration files with sensible defaults. Every section
//! may be omitted; missing sections fall back to their defaults.

use crate::flock::FlockConfig;
use crate::interact::InteractionConfig;
use crate::player::PlayerConfig;
use crate::scanner::ScannerConfig;
use crate::species::{SpeciesDefinition, SpeciesRegistry};
use crate::terrain::TerrainConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("species id '{0}' is defined more than once")]
    DuplicateSpecies(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub flock: FlockConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Replaces the built-in catalog when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<SpeciesDefinition>>,
}

/// World layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width in cells. Zero or negative sizes give an empty reef.
    pub width: i32,
    /// Grid depth in cells
    pub depth: i32,
    /// Fixed seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
    /// Home-point altitude above the local floor
    pub swim_height: f32,
    /// Radius of the ring groups are anchored on, as a fraction of the
    /// smaller half-extent
    pub home_ring_fraction: f32,
}

/// Frame stepping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Advance flocks in fixed steps of this size instead of the raw frame delta
    pub fixed_timestep: Option<f32>,
    /// Frame deltas above this are clamped (seconds)
    pub max_frame_delta: f32,
    /// Cap on fixed steps per frame
    pub max_substeps: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Frames between stats lines in the CLI
    pub stats_interval: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            depth: 50,
            seed: None,
            swim_height: 4.0,
            home_ring_fraction: 0.55,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: None,
            max_frame_delta: 0.1,
            max_substeps: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 60,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world.swim_height.is_finite() && self.world.swim_height >= 0.0) {
            return Err(ConfigError::Invalid("world.swim_height must be >= 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.world.home_ring_fraction) {
            return Err(ConfigError::Invalid(
                "world.home_ring_fraction must be within [0, 1]".to_string(),
            ));
        }

        self.terrain.validate()?;
        self.flock.validate()?;
        self.scanner.validate()?;
        self.interaction.validate()?;
        self.player.validate()?;

        if let Some(step) = self.simulation.fixed_timestep {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Invalid(
                    "simulation.fixed_timestep must be > 0".to_string(),
                ));
            }
        }
        if !(self.simulation.max_frame_delta.is_finite() && self.simulation.max_frame_delta > 0.0) {
            return Err(ConfigError::Invalid(
                "simulation.max_frame_delta must be > 0".to_string(),
            ));
        }
        if self.simulation.max_substeps == 0 {
            return Err(ConfigError::Invalid("simulation.max_substeps must be >= 1".to_string()));
        }
        if self.logging.stats_interval == 0 {
            return Err(ConfigError::Invalid("logging.stats_interval must be > 0".to_string()));
        }

        self.species_registry().map(|_| ())
    }

    /// Species catalog: the configured list, or the built-in reef
    pub fn species_registry(&self) -> Result<SpeciesRegistry, ConfigError> {
        match &self.species {
            Some(defs) => SpeciesRegistry::from_definitions(defs.clone()),
            None => Ok(SpeciesRegistry::reef()),
        }
    }
}
