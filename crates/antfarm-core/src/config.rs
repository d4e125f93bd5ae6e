//! Configuration loading and typed config structures for the Antfarm
//! simulation.
//!
//! The canonical configuration lives in `antfarm-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use antfarm_agents::EcosystemConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `antfarm-config.yaml`. Every section may be
/// omitted and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid size and RNG seed.
    #[serde(default)]
    pub grid: GridConfig,

    /// Initial population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-species tunables (`ant:` and `doodlebug:` sections).
    #[serde(flatten)]
    pub species: EcosystemConfig,

    /// Phase rates and the driver frame budget.
    #[serde(default)]
    pub phases: PhaseConfig,

    /// Run bounds.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ANTFARM_SEED` overrides `grid.seed`
    /// - `ANTFARM_MAX_FRAMES` overrides `simulation.max_frames`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides,
    /// and validate.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("ANTFARM_SEED").and_then(|v| v.trim().parse().ok()) {
            self.grid.seed = seed;
        }
        if let Some(frames) = lookup("ANTFARM_MAX_FRAMES").and_then(|v| v.trim().parse().ok()) {
            self.simulation.max_frames = frames;
        }
    }

    /// Check cross-field constraints.
    ///
    /// Grid dimensions must be positive, the initial population must fit
    /// on the grid, and the species sections must be valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "grid dimensions must be positive, got {}x{}",
                    self.grid.width, self.grid.height
                ),
            });
        }
        let area = u64::from(self.grid.width).saturating_mul(u64::from(self.grid.height));
        let wanted = u64::from(self.population.initial_ants)
            .saturating_add(u64::from(self.population.initial_doodlebugs));
        if wanted > area {
            return Err(ConfigError::Invalid {
                reason: format!("initial population {wanted} exceeds grid area {area}"),
            });
        }
        self.species.validate().map_err(|err| ConfigError::Invalid {
            reason: err.to_string(),
        })
    }
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Columns.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Rows.
    #[serde(default = "default_grid_side")]
    pub height: u32,

    /// Seed for the simulation RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_side(),
            height: default_grid_side(),
            seed: default_seed(),
        }
    }
}

/// Initial population.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Ants placed at startup.
    #[serde(default = "default_initial_ants")]
    pub initial_ants: u32,

    /// Doodlebugs placed at startup.
    #[serde(default = "default_initial_doodlebugs")]
    pub initial_doodlebugs: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_ants: default_initial_ants(),
            initial_doodlebugs: default_initial_doodlebugs(),
        }
    }
}

/// Phase pacing. An fps of 0 means uncapped.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhaseConfig {
    /// Movement pulses per second.
    #[serde(default = "default_movement_fps")]
    pub movement_fps: u32,

    /// Render pulses per second.
    #[serde(default = "default_render_fps")]
    pub render_fps: u32,

    /// Simulated-lag pulses per second.
    #[serde(default)]
    pub lag_fps: u32,

    /// Milliseconds the lag phase blocks per pulse. 0 disables the phase.
    #[serde(default)]
    pub lag_ms: u64,

    /// Driver loop iterations per second.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            movement_fps: default_movement_fps(),
            render_fps: default_render_fps(),
            lag_fps: 0,
            lag_ms: 0,
            target_fps: default_target_fps(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for either field means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Driver loop iterations before the run ends.
    #[serde(default)]
    pub max_frames: u64,

    /// Wall-clock seconds before the run ends.
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_grid_side() -> u32 {
    20
}

const fn default_seed() -> u64 {
    42
}

const fn default_initial_ants() -> u32 {
    100
}

const fn default_initial_doodlebugs() -> u32 {
    5
}

const fn default_movement_fps() -> u32 {
    4
}

const fn default_render_fps() -> u32 {
    10
}

const fn default_target_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse_plain(yaml: &str) -> Result<SimulationConfig, ConfigError> {
        let config: SimulationConfig = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.grid.seed, 42);
        assert_eq!(config.population.initial_ants, 100);
        assert_eq!(config.species.doodlebug.starve_ticks, 3);
        assert_eq!(config.phases.lag_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = parse_plain(include_str!("../../../antfarm-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = parse_plain("{}").unwrap();
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.species, EcosystemConfig::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let yaml = "
grid:
  width: 8
  height: 6
population:
  initial_ants: 10
  initial_doodlebugs: 2
doodlebug:
  breeding_enabled: false
  starve_ticks: 5
phases:
  movement_fps: 2
logging:
  json: true
";
        let config = parse_plain(yaml).unwrap();
        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.seed, 42);
        assert!(!config.species.doodlebug.breeding_enabled);
        assert_eq!(config.species.doodlebug.starve_ticks, 5);
        assert_eq!(config.species.ant.breed_cooldown, 3);
        assert_eq!(config.phases.movement_fps, 2);
        assert_eq!(config.phases.render_fps, 10);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_zero_dimensions() {
        let err = parse_plain("grid:\n  width: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_overfull_population() {
        let yaml = "grid:\n  width: 2\n  height: 2\npopulation:\n  initial_ants: 4\n  initial_doodlebugs: 1\n";
        let err = parse_plain(yaml).unwrap_err();
        assert!(err.to_string().contains("exceeds grid area 4"));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = parse_plain("grid: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn overrides_apply_and_ignore_garbage() {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|key| match key {
            "ANTFARM_SEED" => Some("7".to_owned()),
            "ANTFARM_MAX_FRAMES" => Some("lots".to_owned()),
            _ => None,
        });
        assert_eq!(config.grid.seed, 7);
        assert_eq!(config.simulation.max_frames, 0);
    }
}
