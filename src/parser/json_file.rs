//! JSON configuration parser

use serde_json::Value;
use tracing::warn;

use crate::parser::traits::{ConfigParser, ParseError};
use crate::parser::types::{ConfigFormat, ConfigRecord};

/// Parser for JSON configuration files (e.g. `packages/*/package.json`)
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for JsonParser {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }

    fn parse(&self, content: &str) -> Result<ConfigRecord, ParseError> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            warn!("Failed to parse JSON content: {}", e);
            ParseError::InvalidSyntax {
                format: ConfigFormat::Json,
                message: e.to_string(),
            }
        })?;

        match value {
            Value::Object(record) => Ok(record),
            _ => Err(ParseError::NotATable {
                format: ConfigFormat::Json,
            }),
        }
    }
}
