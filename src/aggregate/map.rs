//! Name to version mapping handed to the documentation renderer

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::entry::PackageEntry;
use crate::aggregate::error::AggregateError;

/// How to treat two files declaring the same package name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The file resolved later in path order wins
    #[default]
    LastWins,
    /// Fail the aggregation pass
    Reject,
}

/// Mapping from package name to version.
///
/// Keys keep the order in which they were first resolved, but equality
/// ignores order. Serializes as a flat object, e.g.
/// `{ "alpha": "1.2.0", "beta": "0.9.3" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionMap(IndexMap<String, String>);

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from entries in resolution order
    pub fn from_entries(
        entries: Vec<PackageEntry>,
        policy: DuplicatePolicy,
    ) -> Result<Self, AggregateError> {
        let mut versions = IndexMap::with_capacity(entries.len());
        let mut sources: HashMap<String, PathBuf> = HashMap::with_capacity(entries.len());

        for entry in entries {
            if let Some(previous) = sources.get(&entry.name) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(AggregateError::DuplicateName {
                            name: entry.name,
                            first: previous.clone(),
                            second: entry.source,
                        });
                    }
                    DuplicatePolicy::LastWins => {
                        warn!(
                            "Package {} declared in both {:?} and {:?}; using version {} from the latter",
                            entry.name, previous, entry.source, entry.version
                        );
                    }
                }
            }

            sources.insert(entry.name.clone(), entry.source);
            versions.insert(entry.name, entry.version);
        }

        Ok(Self(versions))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(name, version)` pairs in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pretty-printed JSON object
    pub fn to_json_pretty(&self) -> String {
        // A map of strings to strings always serializes
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VersionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
