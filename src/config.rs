//! Operator configuration for PSI cardinality deployments
//!
//! Configuration files are TOML. They hold sizing and logging settings only;
//! the Server's secret key is never part of the configuration and is injected
//! into `PsiServer` by the caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-lookup false positive rate for setup filters
const DEFAULT_FALSE_POSITIVE_RATE: f64 = 1e-6;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PsiConfig {
    /// Setup sizing
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Setup filter sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// False positive rate, in (0, 1)
    ///
    /// Without `expected_client_inputs` this is the per-lookup rate. With it,
    /// this is the budget for the whole client query and is divided across
    /// the expected number of lookups.
    #[serde(default = "default_false_positive_rate")]
    pub false_positive_rate: f64,

    /// Expected client set size (optional)
    pub expected_client_inputs: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_false_positive_rate() -> f64 {
    DEFAULT_FALSE_POSITIVE_RATE
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            expected_client_inputs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl ProtocolConfig {
    /// Rate each single Bloom filter lookup must meet.
    pub fn per_lookup_false_positive_rate(&self) -> f64 {
        match self.expected_client_inputs {
            Some(n) if n > 1 => self.false_positive_rate / n as f64,
            _ => self.false_positive_rate,
        }
    }
}

impl PsiConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: PsiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.protocol.false_positive_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "protocol.false_positive_rate must be in (0, 1), got {}",
                rate
            )));
        }

        if self.protocol.expected_client_inputs == Some(0) {
            return Err(ConfigError::Invalid(
                "protocol.expected_client_inputs must be at least 1".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must not be empty".to_string()));
        }

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        format!(
            r#"# PSI Cardinality Configuration
#
# Sizing and logging only. The server's secret key is never stored here.

[protocol]
# Bloom filter false positive rate, strictly between 0 and 1
false_positive_rate = {rate:e}

# Expected number of client items (optional)
# When set, false_positive_rate is the budget for the whole client query
# and each lookup gets false_positive_rate / expected_client_inputs.
# expected_client_inputs = 10000

[logging]
# Log level: trace, debug, info, warn, error
level = "{level}"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/psi/psi.log"
"#,
            rate = DEFAULT_FALSE_POSITIVE_RATE,
            level = DEFAULT_LOG_LEVEL,
        )
    }
}
