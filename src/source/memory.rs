//! In-memory file source

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::source::error::SourceError;
use crate::source::pattern::{PatternSet, to_forward_slashes};
use crate::source::FileSource;

#[derive(Debug, Default)]
struct Files {
    contents: BTreeMap<String, String>,
    unreadable: HashSet<String>,
}

/// File source holding files in memory, keyed by forward-slash relative path.
///
/// Mutations are visible to the next `list_matches`/`read_to_string` call,
/// which makes it usable as a fake tree for exercising change handling.
#[derive(Debug)]
pub struct MemorySource {
    patterns: PatternSet,
    files: RwLock<Files>,
}

impl MemorySource {
    pub fn new(patterns: PatternSet) -> Self {
        Self {
            patterns,
            files: RwLock::new(Files::default()),
        }
    }

    /// Add a file, builder style
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.write(path, content);
        self
    }

    /// Create or overwrite a file
    pub fn write(&self, path: &str, content: &str) {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.contents.insert(path.to_string(), content.to_string());
    }

    /// Remove a file; returns whether it existed
    pub fn remove(&self, path: &str) -> bool {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.unreadable.remove(path);
        files.contents.remove(path).is_some()
    }

    /// Make reads of an existing file fail with `PermissionDenied`
    pub fn deny_read(&self, path: &str) {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.unreadable.insert(path.to_string());
    }
}

#[async_trait]
impl FileSource for MemorySource {
    async fn list_matches(&self) -> Result<Vec<PathBuf>, SourceError> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(self
            .patterns
            .select(files.contents.keys().map(String::as_str))
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    async fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        let key = to_forward_slashes(path);
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        let error_kind = if files.unreadable.contains(&key) {
            io::ErrorKind::PermissionDenied
        } else if let Some(content) = files.contents.get(&key) {
            return Ok(content.clone());
        } else {
            io::ErrorKind::NotFound
        };

        Err(SourceError::Read {
            path: path.to_path_buf(),
            source: io::Error::from(error_kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemorySource {
        MemorySource::new(PatternSet::new(["packages/*/config.toml"]).unwrap())
    }

    #[tokio::test]
    async fn list_matches_reflects_writes_and_removals() {
        let source = source()
            .with_file("packages/b/config.toml", "")
            .with_file("packages/a/config.toml", "")
            .with_file("packages/a/notes.md", "");

        assert_eq!(
            source.list_matches().await.unwrap(),
            vec![
                PathBuf::from("packages/a/config.toml"),
                PathBuf::from("packages/b/config.toml"),
            ]
        );

        assert!(source.remove("packages/a/config.toml"));
        assert!(!source.remove("packages/a/config.toml"));

        assert_eq!(
            source.list_matches().await.unwrap(),
            vec![PathBuf::from("packages/b/config.toml")]
        );
    }

    #[tokio::test]
    async fn read_to_string_returns_latest_content() {
        let source = source().with_file("packages/a/config.toml", "v1");
        source.write("packages/a/config.toml", "v2");

        let text = source
            .read_to_string(Path::new("packages/a/config.toml"))
            .await
            .unwrap();
        assert_eq!(text, "v2");
    }

    #[tokio::test]
    async fn read_to_string_fails_for_denied_file() {
        let source = source().with_file("packages/a/config.toml", "");
        source.deny_read("packages/a/config.toml");

        let err = source
            .read_to_string(Path::new("packages/a/config.toml"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SourceError::Read { ref source, .. } if source.kind() == io::ErrorKind::PermissionDenied
        ));
    }

    #[tokio::test]
    async fn read_to_string_fails_for_missing_file() {
        let err = source()
            .read_to_string(Path::new("packages/x/config.toml"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SourceError::Read { ref source, .. } if source.kind() == io::ErrorKind::NotFound
        ));
    }
}
