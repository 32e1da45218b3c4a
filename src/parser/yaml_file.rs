//! YAML configuration parser

use serde_json::Value;
use tracing::warn;

use crate::parser::traits::{ConfigParser, ParseError};
use crate::parser::types::{ConfigFormat, ConfigRecord};

/// Parser for YAML configuration files (e.g. `packages/*/config.yaml`)
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser for YamlParser {
    fn format(&self) -> ConfigFormat {
        ConfigFormat::Yaml
    }

    fn parse(&self, content: &str) -> Result<ConfigRecord, ParseError> {
        // Non-string mapping keys have no JSON equivalent and fail here.
        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            warn!("Failed to parse YAML content: {}", e);
            ParseError::InvalidSyntax {
                format: ConfigFormat::Yaml,
                message: e.to_string(),
            }
        })?;

        match value {
            Value::Object(record) => Ok(record),
            _ => Err(ParseError::NotATable {
                format: ConfigFormat::Yaml,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_extracts_top_level_fields() {
        let content = "name: gamma\nversion: 3.0.0-rc.1\nprivate: true\n";

        let record = YamlParser::new().parse(content).unwrap();

        assert_eq!(record.get("name"), Some(&json!("gamma")));
        assert_eq!(record.get("version"), Some(&json!("3.0.0-rc.1")));
        assert_eq!(record.get("private"), Some(&json!(true)));
    }

    #[test]
    fn parse_reads_unquoted_decimal_as_number() {
        let record = YamlParser::new().parse("name: gamma\nversion: 1.5\n").unwrap();

        assert_eq!(record.get("version"), Some(&json!(1.5)));
    }

    #[test]
    fn parse_rejects_scalar_document() {
        let result = YamlParser::new().parse("just a string");

        assert!(matches!(
            result,
            Err(ParseError::NotATable {
                format: ConfigFormat::Yaml
            })
        ));
    }

    #[test]
    fn parse_fails_on_unclosed_flow_sequence() {
        let result = YamlParser::new().parse("name: [gamma\nversion: 1.0.0\n");
        assert!(matches!(result, Err(ParseError::InvalidSyntax { .. })));
    }
}
