//! Package version aggregation over a file source

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info};

use crate::aggregate::entry::PackageEntry;
use crate::aggregate::error::AggregateError;
use crate::aggregate::map::{DuplicatePolicy, VersionMap};
use crate::parser::{ConfigFormat, ConfigParser, create_default_parsers, detect_format};
use crate::source::{FileSource, SourceError};

/// Resolves the tracked configuration files into a [`VersionMap`].
///
/// Every call to [`resolve`](Self::resolve) is a full rebuild from the
/// current file set; nothing is carried over between calls.
pub struct PackageVersionAggregator<S: FileSource> {
    source: Arc<S>,
    parsers: HashMap<ConfigFormat, Arc<dyn ConfigParser>>,
    forced_format: Option<ConfigFormat>,
    duplicates: DuplicatePolicy,
}

impl<S: FileSource> PackageVersionAggregator<S> {
    /// Create an aggregator with the default TOML/JSON/YAML parsers
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            parsers: create_default_parsers(),
            forced_format: None,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Parse every file with one format instead of detecting it from the extension
    pub fn with_format(mut self, format: Option<ConfigFormat>) -> Self {
        self.forced_format = format;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Register or replace the parser for its format
    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parsers.insert(parser.format(), parser);
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Resolve all matching files into a version map
    ///
    /// Files are read and parsed concurrently; the map is assembled only
    /// after every file has been processed. Any failure aborts the whole
    /// pass. When several files fail, the error of the first failing path
    /// in resolution order is returned.
    pub async fn resolve(&self) -> Result<VersionMap, AggregateError> {
        let paths = self.source.list_matches().await?;
        debug!("Resolving {} configuration files", paths.len());

        let results = join_all(paths.iter().map(|path| self.load_entry(path))).await;
        let entries = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let versions = VersionMap::from_entries(entries, self.duplicates)?;
        info!(
            "Resolved {} package versions from {} files",
            versions.len(),
            paths.len()
        );

        Ok(versions)
    }

    /// Read, parse and extract a single file
    async fn load_entry(&self, path: &Path) -> Result<PackageEntry, AggregateError> {
        let parser = self.parser_for(path)?;

        let content = self
            .source
            .read_to_string(path)
            .await
            .map_err(|e| match e {
                SourceError::Read { path, source } => AggregateError::FileRead { path, source },
                other => AggregateError::Source(other),
            })?;

        let record = parser
            .parse(&content)
            .map_err(|source| AggregateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let entry = PackageEntry::from_record(&record, path)?;
        debug!("{:?}: {} = {}", path, entry.name, entry.version);
        Ok(entry)
    }

    fn parser_for(&self, path: &Path) -> Result<&Arc<dyn ConfigParser>, AggregateError> {
        self.forced_format
            .or_else(|| detect_format(path))
            .and_then(|format| self.parsers.get(&format))
            .ok_or_else(|| AggregateError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
    }
}
