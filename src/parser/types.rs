//! Common types for parsers

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Key/value record produced by parsing one configuration file.
///
/// Every parser normalizes its native value tree into JSON values so that
/// field extraction works the same way regardless of the source format.
pub type ConfigRecord = serde_json::Map<String, serde_json::Value>;

/// Structured configuration syntax of a package file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// TOML (config.toml, Cargo.toml, pyproject.toml)
    Toml,
    /// JSON (package.json, deno.json)
    Json,
    /// YAML (config.yaml, config.yml)
    Yaml,
}

impl ConfigFormat {
    /// Returns the string representation of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(()),
        }
    }
}

/// Detect the configuration format based on the file extension
pub fn detect_format(path: &Path) -> Option<ConfigFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.to_ascii_lowercase().parse().ok())
}
