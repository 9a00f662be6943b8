//! Configuration loading and typed settings for the SwarmGrid simulation.
//!
//! The canonical configuration lives in `swarmgrid-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, a loader that reads them, and [`SimulationSettings`], the
//! validated parameter set consumed by `initialize` and every tick.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swarmgrid_types::{Holdings, ResourceType};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "SWARMGRID_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "swarmgrid-config.yaml";

/// Tolerance when checking that the role ratios sum to one.
pub const RATIO_SUM_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

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

    /// The parsed settings are not usable.
    #[error("invalid settings: {source}")]
    Settings {
        /// The validation failure.
        #[from]
        source: SettingsError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A settings value outside its allowed range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// Width or height is zero.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Provider, consumer and hybrid ratios do not sum to one.
    #[error("agent ratios must sum to 1, got {sum}")]
    RatiosDoNotSumToOne {
        /// The actual sum.
        sum: f64,
    },

    /// A single ratio is outside `[0, 1]` or not finite.
    #[error("{name} must be within [0, 1], got {value}")]
    RatioOutOfRange {
        /// Settings field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A probability is outside `[0, 1]` or not finite.
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Settings field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Reputation impact is below zero.
    #[error("reputation_impact must not be negative, got {value}")]
    NegativeReputationImpact {
        /// Offending value.
        value: Decimal,
    },

    /// Speed multiplier is not a positive finite number.
    #[error("speed multiplier must be positive and finite, got {multiplier}")]
    InvalidSpeed {
        /// Offending value.
        multiplier: f64,
    },
}

// ---------------------------------------------------------------------------
// File configuration
// ---------------------------------------------------------------------------

/// Top-level configuration file.
///
/// Mirrors the structure of `swarmgrid-config.yaml`. Every field has a
/// default, so a partial or empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run-level options (seed, speed, bounds).
    #[serde(default)]
    pub world: WorldConfig,

    /// Simulation parameters.
    #[serde(default)]
    pub settings: SimulationSettings,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SWARMGRID_SEED` overrides `world.seed`
    /// - `SWARMGRID_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Settings`] if the settings section fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Settings`] if the settings section fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.settings.validate()?;
        validate_speed(config.world.speed)?;
        Ok(config)
    }

    /// Load from [`config_path`], falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        if path.exists() {
            Self::from_file(&path)
        } else {
            Self::parse("")
        }
    }

    /// Override values with environment variables when set and parseable.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = env_parse::<u64>("SWARMGRID_SEED") {
            self.world.seed = seed;
        }
        if let Some(port) = env_parse::<u16>("SWARMGRID_OBSERVER_PORT") {
            self.observer.port = port;
        }
    }
}

/// Accept any positive finite speed multiplier.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidSpeed`] for zero, negative, NaN or
/// infinite values.
pub fn validate_speed(multiplier: f64) -> Result<(), SettingsError> {
    if multiplier.is_finite() && multiplier > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidSpeed { multiplier })
    }
}

/// Path of the config file: `SWARMGRID_CONFIG` or [`DEFAULT_CONFIG_FILE`].
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Initial speed multiplier; tick period is `1000ms / speed`. Fractions
    /// slow the run down.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Start the timer at boot.
    #[serde(default)]
    pub autostart: bool,

    /// Run this many ticks headless and exit (0 = interactive server).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            speed: default_speed(),
            autostart: false,
            max_ticks: 0,
        }
    }
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation settings
// ---------------------------------------------------------------------------

/// Parameters consumed by `initialize` and every tick.
///
/// The core never re-normalizes these; [`validate`](Self::validate) rejects
/// anything inconsistent before state is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Grid width in cells.
    #[serde(default = "default_grid_size")]
    pub grid_width: u32,

    /// Grid height in cells.
    #[serde(default = "default_grid_size")]
    pub grid_height: u32,

    /// Agents spawned at initialization.
    #[serde(default = "default_agent_count")]
    pub initial_agent_count: u32,

    /// Share of providers.
    #[serde(default = "default_provider_ratio")]
    pub provider_ratio: f64,

    /// Share of consumers.
    #[serde(default = "default_consumer_ratio")]
    pub consumer_ratio: f64,

    /// Share of hybrids.
    #[serde(default = "default_hybrid_ratio")]
    pub hybrid_ratio: f64,

    /// Units of each resource type distributed over the grid.
    #[serde(default = "default_initial_resources")]
    pub initial_resources: Holdings,

    /// Per-agent chance of stepping each tick.
    #[serde(default = "default_movement_probability")]
    pub movement_probability: f64,

    /// Per-consumer chance of attempting a trade each tick.
    #[serde(default = "default_trade_probability")]
    pub trade_probability: f64,

    /// Scale of reputation adjustments after a trade.
    #[serde(default = "default_reputation_impact")]
    pub reputation_impact: Decimal,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            grid_width: default_grid_size(),
            grid_height: default_grid_size(),
            initial_agent_count: default_agent_count(),
            provider_ratio: default_provider_ratio(),
            consumer_ratio: default_consumer_ratio(),
            hybrid_ratio: default_hybrid_ratio(),
            initial_resources: default_initial_resources(),
            movement_probability: default_movement_probability(),
            trade_probability: default_trade_probability(),
            reputation_impact: default_reputation_impact(),
        }
    }
}

impl SimulationSettings {
    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(SettingsError::InvalidGridDimensions {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        for (name, value) in [
            ("provider_ratio", self.provider_ratio),
            ("consumer_ratio", self.consumer_ratio),
            ("hybrid_ratio", self.hybrid_ratio),
        ] {
            if !is_unit_interval(value) {
                return Err(SettingsError::RatioOutOfRange { name, value });
            }
        }
        let sum = self.provider_ratio + self.consumer_ratio + self.hybrid_ratio;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(SettingsError::RatiosDoNotSumToOne { sum });
        }

        for (name, value) in [
            ("movement_probability", self.movement_probability),
            ("trade_probability", self.trade_probability),
        ] {
            if !is_unit_interval(value) {
                return Err(SettingsError::ProbabilityOutOfRange { name, value });
            }
        }

        if self.reputation_impact < Decimal::ZERO {
            return Err(SettingsError::NegativeReputationImpact {
                value: self.reputation_impact,
            });
        }

        Ok(())
    }
}

fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// A partial settings change. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    /// New grid width.
    #[serde(default)]
    pub grid_width: Option<u32>,
    /// New grid height.
    #[serde(default)]
    pub grid_height: Option<u32>,
    /// New population size.
    #[serde(default)]
    pub initial_agent_count: Option<u32>,
    /// New provider share.
    #[serde(default)]
    pub provider_ratio: Option<f64>,
    /// New consumer share.
    #[serde(default)]
    pub consumer_ratio: Option<f64>,
    /// New hybrid share.
    #[serde(default)]
    pub hybrid_ratio: Option<f64>,
    /// New per-type resource totals; omitted types keep their value.
    #[serde(default)]
    pub initial_resources: Option<BTreeMap<ResourceType, u32>>,
    /// New movement probability.
    #[serde(default)]
    pub movement_probability: Option<f64>,
    /// New trade probability.
    #[serde(default)]
    pub trade_probability: Option<f64>,
    /// New reputation impact.
    #[serde(default)]
    pub reputation_impact: Option<Decimal>,
}

impl SettingsUpdate {
    /// Merge this update over `base`.
    pub fn apply(&self, base: &SimulationSettings) -> SimulationSettings {
        let mut initial_resources = base.initial_resources.clone();
        if let Some(resources) = &self.initial_resources {
            initial_resources.extend(resources.iter().map(|(r, q)| (*r, *q)));
        }
        SimulationSettings {
            grid_width: self.grid_width.unwrap_or(base.grid_width),
            grid_height: self.grid_height.unwrap_or(base.grid_height),
            initial_agent_count: self.initial_agent_count.unwrap_or(base.initial_agent_count),
            provider_ratio: self.provider_ratio.unwrap_or(base.provider_ratio),
            consumer_ratio: self.consumer_ratio.unwrap_or(base.consumer_ratio),
            hybrid_ratio: self.hybrid_ratio.unwrap_or(base.hybrid_ratio),
            initial_resources,
            movement_probability: self
                .movement_probability
                .unwrap_or(base.movement_probability),
            trade_probability: self.trade_probability.unwrap_or(base.trade_probability),
            reputation_impact: self.reputation_impact.unwrap_or(base.reputation_impact),
        }
    }
}

/// Whether moving from `old` to `new` requires rebuilding the state.
///
/// Grid size, population and initial resources only take effect at
/// initialization; probabilities and reputation impact apply to the next
/// tick.
pub fn is_structural_change(old: &SimulationSettings, new: &SimulationSettings) -> bool {
    old.grid_width != new.grid_width
        || old.grid_height != new.grid_height
        || old.initial_agent_count != new.initial_agent_count
        || old.provider_ratio.to_bits() != new.provider_ratio.to_bits()
        || old.consumer_ratio.to_bits() != new.consumer_ratio.to_bits()
        || old.hybrid_ratio.to_bits() != new.hybrid_ratio.to_bits()
        || old.initial_resources != new.initial_resources
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "SwarmGrid".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_speed() -> f64 {
    1.0
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_grid_size() -> u32 {
    20
}

const fn default_agent_count() -> u32 {
    50
}

const fn default_provider_ratio() -> f64 {
    0.4
}

const fn default_consumer_ratio() -> f64 {
    0.4
}

const fn default_hybrid_ratio() -> f64 {
    0.2
}

fn default_initial_resources() -> Holdings {
    swarmgrid_types::uniform_holdings(1000)
}

const fn default_movement_probability() -> f64 {
    0.3
}

const fn default_trade_probability() -> f64 {
    0.5
}

const fn default_reputation_impact() -> Decimal {
    // 0.1
    Decimal::from_parts(1, 0, 0, false, 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = SimulationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grid_width, 20);
        assert_eq!(settings.initial_agent_count, 50);
        assert_eq!(settings.reputation_impact, dec!(0.1));
        assert_eq!(settings.initial_resources[&ResourceType::Data], 1000);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test Grid"
  seed: 123
  speed: 4
  autostart: true
  max_ticks: 500

settings:
  grid_width: 5
  grid_height: 8
  initial_agent_count: 10
  provider_ratio: 0.5
  consumer_ratio: 0.5
  hybrid_ratio: 0.0
  initial_resources:
    compute: 10
    storage: 20
    data: 30
  movement_probability: 0.0
  trade_probability: 1.0
  reputation_impact: 0.25

observer:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
  format: json
"#;

        let config = SimulationConfig::parse(yaml).unwrap();

        assert_eq!(config.world.name, "Test Grid");
        assert_eq!(config.world.speed, 4.0);
        assert!(config.world.autostart);
        assert_eq!(config.world.max_ticks, 500);
        assert_eq!(config.settings.grid_height, 8);
        assert_eq!(config.settings.initial_resources[&ResourceType::Storage], 20);
        assert_eq!(config.settings.trade_probability, 1.0);
        assert_eq!(config.settings.reputation_impact, dec!(0.25));
        assert_eq!(config.observer.host, "127.0.0.1");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("settings:\n  grid_width: 7\n").unwrap();
        assert_eq!(config.settings.grid_width, 7);
        // Everything else uses defaults
        assert_eq!(config.settings.grid_height, 20);
        assert_eq!(config.observer.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn fractional_speed_is_accepted() {
        let config = SimulationConfig::parse("world:\n  speed: 0.5\n").unwrap();
        assert_eq!(config.world.speed, 0.5);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        for yaml in ["world:\n  speed: 0\n", "world:\n  speed: -2.5\n", "world:\n  speed: .nan\n"] {
            assert!(
                matches!(
                    SimulationConfig::parse(yaml),
                    Err(ConfigError::Settings {
                        source: SettingsError::InvalidSpeed { .. }
                    })
                ),
                "{yaml}"
            );
        }
        assert!(validate_speed(f64::INFINITY).is_err());
        assert!(validate_speed(0.01).is_ok());
    }

    #[test]
    fn invalid_yaml_settings_are_rejected() {
        let result = SimulationConfig::parse("settings:\n  grid_width: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Settings {
                source: SettingsError::InvalidGridDimensions { .. }
            })
        ));
    }

    #[test]
    fn zero_dimension_rejected() {
        let settings = SimulationSettings {
            grid_height: 0,
            ..SimulationSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidGridDimensions { width: 20, height: 0 })
        );
    }

    #[test]
    fn ratios_must_sum_to_one() {
        let settings = SimulationSettings {
            hybrid_ratio: 0.3,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::RatiosDoNotSumToOne { .. })
        ));
    }

    #[test]
    fn ratio_outside_unit_interval_rejected() {
        let settings = SimulationSettings {
            provider_ratio: 1.2,
            consumer_ratio: -0.2,
            hybrid_ratio: 0.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::RatioOutOfRange { name: "provider_ratio", .. })
        ));
    }

    #[test]
    fn probability_outside_unit_interval_rejected() {
        let settings = SimulationSettings {
            trade_probability: f64::NAN,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::ProbabilityOutOfRange { name: "trade_probability", .. })
        ));
    }

    #[test]
    fn negative_reputation_impact_rejected() {
        let settings = SimulationSettings {
            reputation_impact: dec!(-0.5),
            ..SimulationSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NegativeReputationImpact { value: dec!(-0.5) })
        );
    }

    #[test]
    fn update_merges_and_classifies() {
        let base = SimulationSettings::default();

        let behavioral = SettingsUpdate {
            trade_probability: Some(0.9),
            ..SettingsUpdate::default()
        };
        let merged = behavioral.apply(&base);
        assert_eq!(merged.trade_probability, 0.9);
        assert_eq!(merged.grid_width, base.grid_width);
        assert!(!is_structural_change(&base, &merged));

        let mut resources = BTreeMap::new();
        resources.insert(ResourceType::Compute, 5);
        let structural = SettingsUpdate {
            initial_resources: Some(resources),
            ..SettingsUpdate::default()
        };
        let merged = structural.apply(&base);
        assert_eq!(merged.initial_resources[&ResourceType::Compute], 5);
        assert_eq!(merged.initial_resources[&ResourceType::Storage], 1000);
        assert!(is_structural_change(&base, &merged));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
