//! Shared test utilities

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use package_versions::aggregate::PackageVersionAggregator;
use package_versions::source::{FsSource, PatternSet};

/// Pattern used by the documentation site in the fixtures
pub const PATTERN: &str = "packages/*/config.toml";

/// Temporary source tree with one config file per package directory
pub struct PackageTree {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl PackageTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `packages/<dir>/config.toml` declaring the given name and version
    pub fn add_package(&self, dir: &str, name: &str, version: &str) -> &Self {
        self.write(
            &format!("packages/{dir}/config.toml"),
            &format!("name = \"{name}\"\nversion = \"{version}\"\n"),
        )
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    /// Create `relative` as a symlink to `target`, both relative to the root
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, relative: &str) -> &Self {
        let link = self.root().join(relative);
        std::fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(self.root().join(target), link).unwrap();
        self
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.root().join(relative)).unwrap();
    }

    pub fn source(&self) -> Arc<FsSource> {
        Arc::new(FsSource::new(
            self.root(),
            PatternSet::new([PATTERN]).unwrap(),
        ))
    }

    pub fn aggregator(&self) -> PackageVersionAggregator<FsSource> {
        PackageVersionAggregator::new(self.source())
    }
}
