use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid glob pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to walk {}: {message}", root.display())]
    Walk { root: PathBuf, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
