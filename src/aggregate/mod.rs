//! Aggregation layer
//!
//! Turns the set of tracked configuration files into one name to version
//! mapping.
//!
//! ```text
//! patterns ─▶ [paths] ─▶ [text] ─▶ [ConfigRecord] ─▶ [PackageEntry] ─▶ VersionMap
//! ```
//!
//! # Modules
//!
//! - [`aggregator`]: `PackageVersionAggregator`, the full-rebuild resolve pass
//! - [`entry`]: Validated `name`/`version` extraction
//! - [`map`]: `VersionMap` and the duplicate-name policy
//! - [`error`]: Error type for an aggregation pass

pub mod aggregator;
pub mod entry;
pub mod error;
pub mod map;

pub use aggregator::PackageVersionAggregator;
pub use entry::PackageEntry;
pub use error::AggregateError;
pub use map::{DuplicatePolicy, VersionMap};
