//! Configuration loading and typed config structures for the Hydroequity
//! simulation.
//!
//! The configuration lives in `hydroequity-config.yaml` at the project
//! root. Every section and every field is optional; missing values fall
//! back to the defaults below. The file is validated after parsing.

use std::path::Path;

use hydroequity_network::NetworkCatalog;
use hydroequity_types::Scenario;
use serde::Deserialize;
use tracing::warn;

/// Environment variable overriding `infrastructure.observer_port`.
pub const OBSERVER_PORT_ENV: &str = "OBSERVER_PORT";

/// Smallest tick interval the runner accepts, in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

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

    /// The YAML parsed but a value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
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
/// Mirrors the structure of `hydroequity-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial supply scenario.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Equity allocator training parameters.
    #[serde(default)]
    pub training: TrainingConfig,

    /// Rolling history settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Observer server settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replacement for the built-in Sogamoso catalog.
    #[serde(default)]
    pub network: Option<NetworkCatalog>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `OBSERVER_PORT` overrides `infrastructure.observer_port` when set to
    /// a valid port number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        let port = std::env::var(OBSERVER_PORT_ENV).ok();
        config.infrastructure.apply_port_override(port.as_deref());
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the simulation misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(invalid(format!(
                "world.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}, got {}",
                self.world.tick_interval_ms
            )));
        }
        if self.history.capacity == 0 {
            return Err(invalid("history.capacity must be at least 1".to_owned()));
        }
        let total = self.training.representative_total_available;
        if !total.is_finite() || total < 0.0 {
            return Err(invalid(format!(
                "training.representative_total_available must be a non-negative number, got {total}"
            )));
        }
        if !self.training.learning_rate.is_finite() || !self.training.damping.is_finite() {
            return Err(invalid(
                "training.learning_rate and training.damping must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for demand noise and equity weight initialization.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Start with the tick loop paused.
    #[serde(default)]
    pub start_paused: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
            start_paused: false,
        }
    }
}

/// Scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario active at startup. Unknown names resolve to `normal`.
    #[serde(default = "default_scenario")]
    pub initial: String,
}

impl ScenarioConfig {
    /// Resolve the configured name, warning when it is not recognized.
    pub fn resolve(&self) -> Scenario {
        resolve_scenario(&self.initial)
    }
}

/// Parse a scenario name, falling back to [`Scenario::Normal`] with a
/// warning when it is not recognized.
pub fn resolve_scenario(name: &str) -> Scenario {
    Scenario::from_name(name).unwrap_or_else(|| {
        warn!(scenario = name, "Unknown scenario, using normal");
        Scenario::Normal
    })
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            initial: default_scenario(),
        }
    }
}

/// Equity allocator training configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingConfig {
    /// Weight updates per training run.
    #[serde(default = "default_epochs")]
    pub epochs: u32,

    /// Supply total of the representative training snapshot.
    #[serde(default = "default_representative_total")]
    pub representative_total_available: f64,

    /// Step size of the weight update.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Multiplier applied on top of the learning rate.
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Let `train` run again after the allocator has been trained.
    #[serde(default)]
    pub allow_retrain: bool,

    /// Train once before the first tick.
    #[serde(default)]
    pub train_on_start: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            representative_total_available: default_representative_total(),
            learning_rate: default_learning_rate(),
            damping: default_damping(),
            allow_retrain: false,
            train_on_start: false,
        }
    }
}

/// Rolling history configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Number of records kept; older ones are dropped.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the simulation ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the simulation ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Observer HTTP port.
    #[serde(default = "default_observer_port")]
    pub observer_port: u16,
}

impl InfrastructureConfig {
    /// Replace the observer port with `value` when it parses as a port.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_port_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.observer_port = port,
            Err(_) => warn!(
                value = raw,
                env = OBSERVER_PORT_ENV,
                "Ignoring invalid observer port override"
            ),
        }
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            observer_port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Hydroequity Sogamoso".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_scenario() -> String {
    "normal".to_owned()
}

const fn default_epochs() -> u32 {
    500
}

const fn default_representative_total() -> f64 {
    275.0
}

const fn default_learning_rate() -> f64 {
    0.01
}

const fn default_damping() -> f64 {
    0.1
}

const fn default_history_capacity() -> usize {
    24
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
