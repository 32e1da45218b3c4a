//! Parser layer
//! - traits.rs: ConfigParser trait definition
//! - types.rs: Common types (ConfigRecord, ConfigFormat)
//! - toml_file.rs: TOML parser
//! - json_file.rs: JSON parser
//! - yaml_file.rs: YAML parser

pub mod json_file;
pub mod toml_file;
pub mod traits;
pub mod types;
pub mod yaml_file;

use std::collections::HashMap;
use std::sync::Arc;

pub use json_file::JsonParser;
pub use toml_file::TomlParser;
pub use traits::{ConfigParser, ParseError};
pub use types::{ConfigFormat, ConfigRecord, detect_format};
pub use yaml_file::YamlParser;

/// Create the default set of parsers for all supported formats
pub fn create_default_parsers() -> HashMap<ConfigFormat, Arc<dyn ConfigParser>> {
    let mut parsers: HashMap<ConfigFormat, Arc<dyn ConfigParser>> = HashMap::new();
    parsers.insert(ConfigFormat::Toml, Arc::new(TomlParser::new()));
    parsers.insert(ConfigFormat::Json, Arc::new(JsonParser::new()));
    parsers.insert(ConfigFormat::Yaml, Arc::new(YamlParser::new()));
    parsers
}
