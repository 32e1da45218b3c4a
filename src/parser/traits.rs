//! Parser trait definition

use crate::parser::types::{ConfigFormat, ConfigRecord};

/// Trait for decoding the text of a package configuration file
pub trait ConfigParser: Send + Sync {
    /// Format this parser understands
    fn format(&self) -> ConfigFormat;

    /// Parse the content into a loosely-typed key/value record
    fn parse(&self, content: &str) -> Result<ConfigRecord, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not valid in the given format
    #[error("Invalid {format} syntax: {message}")]
    InvalidSyntax {
        format: ConfigFormat,
        message: String,
    },

    /// The document parsed, but its top-level value is not a key/value table
    #[error("Top-level {format} value is not a table")]
    NotATable { format: ConfigFormat },
}
