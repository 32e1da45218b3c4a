//! Aggregates per-package `name`/`version` metadata into a single map for
//! documentation builds, and rebuilds it whenever a tracked file changes.
//!
//! # Modules
//!
//! - [`parser`]: Decoding of TOML/JSON/YAML configuration files
//! - [`source`]: Enumerating and reading files matching glob patterns
//! - [`aggregate`]: Extraction of package entries and the `VersionMap`
//! - [`publish`]: Last-known-good publication of the map
//! - [`watch`]: Polling change detection
//! - [`rebuild`]: Serialized rebuilds driven by change notifications
//! - [`output`]: Writing the map for the site renderer
//! - [`config`]: Configuration file and defaults
//! - [`logging`]: Tracing subscriber setup

pub mod aggregate;
pub mod config;
pub mod logging;
pub mod output;
pub mod parser;
pub mod publish;
pub mod rebuild;
pub mod source;
pub mod watch;

pub use aggregate::{AggregateError, DuplicatePolicy, PackageVersionAggregator, VersionMap};
pub use publish::VersionStore;
