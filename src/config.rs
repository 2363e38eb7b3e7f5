//! Configuration system for the wealth distribution simulation.
//!
//! Parameters are read from YAML files. Every simulation parameter is
//! required; only the logging section falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub turtles: TurtleConfig,
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Land and grain configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of patches along the x axis
    pub width: usize,
    /// Number of patches along the y axis
    pub height: usize,
    /// Chance (0 - 100) that a patch starts as best land
    pub percent_best_land: f64,
    /// Grain held by a best-land patch before diffusion
    pub max_grain: u32,
    /// Grain added to a patch per growth event
    pub num_grain_grown: u32,
    /// Ticks between growth events
    pub grain_growth_interval: u64,
    /// Share of a patch's grain spread to its neighbours per diffusion
    pub diffusion_proportion: f64,
}

/// Turtle population configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Number of turtles
    pub num_people: usize,
    /// Upper bound (inclusive) of grain eaten per tick
    pub metabolism_max: u32,
    /// Upper bound (inclusive) of patches seen ahead
    pub max_vision: u32,
    pub life_expectancy_min: u32,
    pub life_expectancy_max: u32,
    /// Exclusive bound of the random part of a fresh turtle's wealth
    pub initial_wealth_bound: u32,
    /// Reborn turtles inherit their non-negative wealth
    pub inheritance: bool,
}

/// Run length and reproducibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of ticks to simulate
    pub max_ticks: u64,
    /// Seed for the single random stream
    pub seed: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Ticks between summary log lines
    pub stats_interval: u64,
    /// Dump the grain table after every setup diffusion pass
    pub dump_grid: bool,
}

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            turtles: TurtleConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 51,
            height: 51,
            percent_best_land: 10.0,
            max_grain: 50,
            num_grain_grown: 4,
            grain_growth_interval: 1,
            diffusion_proportion: 0.25,
        }
    }
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            num_people: 250,
            metabolism_max: 15,
            max_vision: 5,
            life_expectancy_min: 1,
            life_expectancy_max: 83,
            initial_wealth_bound: 50,
            inheritance: false,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: 200,
            seed: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 10,
            dump_grid: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
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
        let world = &self.world;
        let turtles = &self.turtles;

        if world.width == 0 || world.height == 0 {
            return invalid("width and height must be > 0");
        }
        if i64::try_from(world.width).is_err() || i64::try_from(world.height).is_err() {
            return invalid("width and height are too large");
        }
        if !(0.0..=100.0).contains(&world.percent_best_land) {
            return invalid("percent_best_land must be between 0 and 100");
        }
        if !(0.0..=1.0).contains(&world.diffusion_proportion) {
            return invalid("diffusion_proportion must be between 0 and 1");
        }
        if world.grain_growth_interval == 0 {
            return invalid("grain_growth_interval must be > 0");
        }
        if turtles.metabolism_max == 0 {
            return invalid("metabolism_max must be > 0");
        }
        if turtles.max_vision == 0 {
            return invalid("max_vision must be > 0");
        }
        if turtles.life_expectancy_min == 0 {
            return invalid("life_expectancy_min must be > 0");
        }
        if turtles.life_expectancy_min > turtles.life_expectancy_max {
            return invalid("life_expectancy_min cannot exceed life_expectancy_max");
        }
        if turtles.initial_wealth_bound == 0 {
            return invalid("initial_wealth_bound must be > 0");
        }
        if self.logging.stats_interval == 0 {
            return invalid("stats_interval must be > 0");
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.to_string()))
}
