// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use config::{Config, ConfigError, Environment, File};

use crate::inventory::InventoryConfig;

/// Configuration for the models directory and the index artifact
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Directory where model executables are stored
    pub directory: PathBuf,
    /// File name of the index artifact, written inside `directory`
    pub index_file: String,
    /// Extension a file must carry to be treated as a model executable
    pub executable_extension: String,
    /// Argument that asks an executable to describe itself
    pub introspection_flag: String,
    /// Whether executables without a tier prefix are still probed for details
    pub probe_unprefixed: bool,
    /// Remove the index artifact when the service shuts down
    pub remove_index_on_exit: bool,
    /// Operation ids that are valid without a matching executable
    #[serde(default)]
    pub known_operations: Vec<String>,
}

/// Limits applied while probing executables
#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Per-executable timeout in seconds
    pub timeout_secs: u64,
    /// Timeout for a whole batch of probes in seconds
    pub batch_timeout_secs: u64,
    /// Maximum number of executables running at once
    pub max_parallel: usize,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Directory for the rolling log files
    pub directory: PathBuf,
    /// Emit JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub models: ModelsConfig,
    pub probe: ProbeConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Loads settings from `./config` under the current directory.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::from_dir(&config_dir)
    }

    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with IPHENO_ (e.g. IPHENO_PROBE__TIMEOUT_SECS)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(Environment::with_prefix("IPHENO").prefix_separator("_").separator("__"))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.index_file.trim().is_empty() {
            return Err(ConfigError::Message("models.index_file must not be empty".to_string()));
        }

        if self.models.executable_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Message(
                "models.executable_extension must not be empty".to_string()
            ));
        }

        if self.models.introspection_flag.trim().is_empty() {
            return Err(ConfigError::Message(
                "models.introspection_flag must not be empty".to_string()
            ));
        }

        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "probe.timeout_secs must be greater than 0".to_string()
            ));
        }

        if self.probe.batch_timeout_secs < self.probe.timeout_secs {
            return Err(ConfigError::Message(format!(
                "probe.batch_timeout_secs ({}) must not be shorter than probe.timeout_secs ({})",
                self.probe.batch_timeout_secs, self.probe.timeout_secs
            )));
        }

        if self.probe.max_parallel == 0 {
            return Err(ConfigError::Message(
                "probe.max_parallel must be greater than 0".to_string()
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535, got: 0".to_string()
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        if !self.logging.directory.exists() {
            std::fs::create_dir_all(&self.logging.directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create log directory at {}: {}",
                    self.logging.directory.display(), e
                ))
            })?;
        }

        Ok(())
    }

    /// Full path of the index artifact.
    pub fn index_path(&self) -> PathBuf {
        self.models.directory.join(&self.models.index_file)
    }

    /// Base URL the console uses to reach the server.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }

    /// Builder configuration derived from these settings.
    pub fn inventory(&self) -> InventoryConfig {
        InventoryConfig {
            executable_extension: self.models.executable_extension
                .trim_start_matches('.')
                .to_string(),
            introspection_flag: self.models.introspection_flag.clone(),
            probe_unprefixed: self.models.probe_unprefixed,
            probe_timeout: Duration::from_secs(self.probe.timeout_secs),
            batch_timeout: Duration::from_secs(self.probe.batch_timeout_secs),
            max_parallel: self.probe.max_parallel,
        }
    }
}
