//! Filesystem-backed file source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::source::error::SourceError;
use crate::source::pattern::{PatternSet, WalkRoot, to_forward_slashes};
use crate::source::FileSource;

/// File source resolving patterns against a directory tree
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    patterns: PatternSet,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>, patterns: PatternSet) -> Self {
        Self {
            root: root.into(),
            patterns,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Collect all files below the walk roots as relative forward-slash paths.
    ///
    /// Symlinks are followed. A dangling link is kept as a candidate so that a
    /// matching one fails on read instead of vanishing from the result.
    fn collect_candidates(root: &Path, walk_roots: &[WalkRoot]) -> Result<Vec<String>, SourceError> {
        let mut candidates = Vec::new();

        for walk_root in walk_roots {
            let start = if walk_root.prefix.is_empty() {
                root.to_path_buf()
            } else {
                root.join(&walk_root.prefix)
            };

            // A prefix directory that does not exist yet simply has no matches
            if !start.is_dir() {
                debug!("Skipping missing directory {:?}", start);
                continue;
            }

            let mut walker = WalkDir::new(&start).follow_links(true).sort_by_file_name();
            if let Some(depth) = walk_root.max_depth {
                walker = walker.max_depth(depth);
            }

            for entry in walker {
                let path = match entry {
                    Ok(entry) if entry.file_type().is_file() => entry.into_path(),
                    Ok(_) => continue,
                    Err(e) if e.loop_ancestor().is_some() => {
                        warn!("Skipping symlink loop at {:?}", e.path());
                        continue;
                    }
                    Err(e) => match e.path() {
                        Some(path) if is_dangling_link(path) => path.to_path_buf(),
                        _ => {
                            return Err(SourceError::Walk {
                                root: start.clone(),
                                message: e.to_string(),
                            });
                        }
                    },
                };
                if let Ok(relative) = path.strip_prefix(root) {
                    candidates.push(to_forward_slashes(relative));
                }
            }
        }

        Ok(candidates)
    }
}

fn is_dangling_link(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|metadata| metadata.file_type().is_symlink())
        && !path.exists()
}

#[async_trait]
impl FileSource for FsSource {
    async fn list_matches(&self) -> Result<Vec<PathBuf>, SourceError> {
        let root = self.root.clone();
        let walk_roots = self.patterns.walk_roots();

        let candidates =
            tokio::task::spawn_blocking(move || Self::collect_candidates(&root, &walk_roots))
                .await
                .map_err(|e| SourceError::Walk {
                    root: self.root.clone(),
                    message: e.to_string(),
                })??;

        let matches: Vec<PathBuf> = self
            .patterns
            .select(candidates.iter().map(String::as_str))
            .into_iter()
            .map(|relative| self.root.join(relative))
            .collect();

        debug!(
            "Resolved {} files for patterns {:?}",
            matches.len(),
            self.patterns.patterns()
        );
        Ok(matches)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String, SourceError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}
