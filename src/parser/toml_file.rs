//! TOML configuration parser

use serde_json::Value;
use tracing::warn;

use crate::parser::traits::{ConfigParser, ParseError};
use crate::parser::types::{ConfigFormat, ConfigRecord};

/// Parser for TOML configuration files (e.g. `packages/*/config.toml`)
pub struct TomlParser;

impl TomlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TomlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for TomlParser {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Toml
    }

    fn parse(&self, content: &str) -> Result<ConfigRecord, ParseError> {
        let value: Value = toml::from_str(content).map_err(|e| {
            warn!("Failed to parse TOML content: {}", e);
            ParseError::InvalidSyntax {
                format: ConfigFormat::Toml,
                message: e.message().to_string(),
            }
        })?;

        match value {
            Value::Object(record) => Ok(record),
            _ => Err(ParseError::NotATable {
                format: ConfigFormat::Toml,
            }),
        }
    }
}
