//! File source layer
//!
//! The aggregator never touches the filesystem directly. It talks to a
//! [`FileSource`], which enumerates the paths matching the configured
//! patterns and reads their text.
//!
//! # Modules
//!
//! - [`fs`]: Real filesystem source (walkdir traversal + wax matching)
//! - [`memory`]: In-memory source for tests and embedding
//! - [`pattern`]: Validated glob pattern set and resolution ordering
//! - [`error`]: Error type for source operations

pub mod error;
pub mod fs;
pub mod memory;
pub mod pattern;

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

pub use error::SourceError;
pub use fs::FsSource;
pub use memory::MemorySource;
pub use pattern::{PatternSet, WalkRoot};

/// Trait for enumerating and reading tracked configuration files
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FileSource: Send + Sync {
    /// Returns the paths currently matching the patterns, in resolution order
    ///
    /// Matches of each pattern are sorted by path; patterns are concatenated
    /// in the order they were configured.
    async fn list_matches(&self) -> Result<Vec<PathBuf>, SourceError>;

    /// Reads the full text of one matched file
    async fn read_to_string(&self, path: &Path) -> Result<String, SourceError>;
}
