use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::aggregate::DuplicatePolicy;
use crate::parser::ConfigFormat;
use crate::source::{PatternSet, SourceError};

// =============================================================================
// Defaults
// =============================================================================

/// Name of the configuration file looked up in the tracked root
pub const CONFIG_FILE_NAME: &str = "package-versions.toml";

/// Pattern used when neither the config file nor the CLI names one
pub const DEFAULT_PATTERN: &str = "packages/*/config.toml";

/// Default interval between two change polls in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Lower bound for the poll interval in milliseconds
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Pattern(#[from] SourceError),
}

/// Aggregator configuration structure, as read from `package-versions.toml`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AggregatorConfig {
    /// Directory the patterns are relative to
    pub root: PathBuf,
    /// Glob patterns selecting the package configuration files
    pub patterns: Vec<String>,
    /// Parse every file with this format instead of detecting it per file
    pub format: Option<ConfigFormat>,
    /// Tie-break for two files declaring the same package name
    pub duplicates: DuplicatePolicy,
    /// Where to write the resolved map; stdout when absent
    pub output: Option<PathBuf>,
    pub watch: WatchConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            patterns: vec![DEFAULT_PATTERN.to_string()],
            format: None,
            duplicates: DuplicatePolicy::default(),
            output: None,
            watch: WatchConfig::default(),
        }
    }
}

/// Watch-mode configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct WatchConfig {
    /// Interval between two change polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl AggregatorConfig {
    /// Load a config file; a relative `root` is resolved against the file's directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.root.is_relative()
            && let Some(dir) = path.parent()
        {
            config.root = dir.join(&config.root);
        }

        Ok(config)
    }

    /// Load `package-versions.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self {
                root: dir.to_path_buf(),
                ..Self::default()
            })
        }
    }

    /// Check values that would otherwise fail later at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::Invalid {
                field: "patterns",
                reason: "at least one pattern is required".to_string(),
            });
        }
        if let Some(pattern) = self.patterns.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "patterns",
                reason: format!("empty pattern {:?}", pattern),
            });
        }
        if self.watch.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                field: "watch.poll-interval-ms",
                reason: format!("must be at least {}", MIN_POLL_INTERVAL_MS),
            });
        }
        self.pattern_set()?;
        Ok(())
    }

    /// Compile the configured patterns
    pub fn pattern_set(&self) -> Result<PatternSet, SourceError> {
        PatternSet::new(self.patterns.iter().cloned())
    }
}

/// Returns the path to the data directory for package-versions.
/// Uses $XDG_DATA_HOME/package-versions if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/package-versions,
/// or ./package-versions if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default log file.
pub fn log_path() -> PathBuf {
    data_dir().join("package-versions.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("package-versions")
}
