use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{} is missing required field `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{} has invalid field `{field}`: {reason}", path.display())]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },

    #[error("Unsupported configuration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error(
        "Package `{name}` is declared by both {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to resolve configuration files: {0}")]
    Source(#[from] SourceError),
}

impl AggregateError {
    /// Path of the offending file, if the error concerns a single file
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            AggregateError::FileRead { path, .. }
            | AggregateError::Parse { path, .. }
            | AggregateError::MissingField { path, .. }
            | AggregateError::InvalidField { path, .. }
            | AggregateError::UnsupportedFormat { path } => Some(path.as_path()),
            AggregateError::DuplicateName { second, .. } => Some(second.as_path()),
            AggregateError::Source(SourceError::Read { path, .. }) => Some(path.as_path()),
            AggregateError::Source(_) => None,
        }
    }
}
