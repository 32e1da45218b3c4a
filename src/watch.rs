//! Polling change detection for tracked configuration files

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::source::{FileSource, SourceError};

/// Kind of change observed for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// A single changed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Set of changes observed between two polls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    pub changes: Vec<FileChange>,
}

impl ChangeEvent {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Content of every matched path at one point in time.
///
/// `None` marks a file that matched but could not be read; the next
/// aggregation pass reports the actual error.
pub type Snapshot = BTreeMap<PathBuf, Option<String>>;

/// Compute the changes that turn `previous` into `current`, ordered by path
pub fn diff(previous: &Snapshot, current: &Snapshot) -> ChangeEvent {
    let mut changes = Vec::new();

    for (path, content) in current {
        match previous.get(path) {
            None => changes.push(FileChange {
                path: path.clone(),
                kind: ChangeKind::Created,
            }),
            Some(old) if old != content => changes.push(FileChange {
                path: path.clone(),
                kind: ChangeKind::Modified,
            }),
            Some(_) => {}
        }
    }

    for path in previous.keys() {
        if !current.contains_key(path) {
            changes.push(FileChange {
                path: path.clone(),
                kind: ChangeKind::Removed,
            });
        }
    }

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    ChangeEvent { changes }
}

/// Watches a [`FileSource`] by polling it at a fixed interval
pub struct ChangeWatcher<S: FileSource> {
    source: Arc<S>,
    poll_interval: Duration,
}

impl<S: FileSource> ChangeWatcher<S> {
    pub fn new(source: Arc<S>, poll_interval: Duration) -> Self {
        Self {
            source,
            poll_interval,
        }
    }

    /// Take a snapshot of all currently matching files
    pub async fn snapshot(&self) -> Result<Snapshot, SourceError> {
        let paths = self.source.list_matches().await?;
        let contents = join_all(paths.iter().map(|path| self.source.read_to_string(path))).await;

        Ok(paths
            .into_iter()
            .zip(contents)
            .map(|(path, content)| (path, content.ok()))
            .collect())
    }

    /// Snapshot to compare the first poll against.
    ///
    /// Take it before the initial resolve so that a change landing between
    /// that resolve and the first poll is still reported. A failed listing
    /// yields an empty baseline.
    pub async fn baseline(&self) -> Snapshot {
        self.snapshot()
            .await
            .inspect_err(|e| warn!("Initial snapshot failed: {}", e))
            .unwrap_or_default()
    }

    /// Poll until `shutdown` flips to true or the receiver of `events` is dropped
    ///
    /// Every poll is compared with the one before it, starting from
    /// `baseline`. A poll whose listing fails is skipped and compared again
    /// on the next tick.
    pub async fn run(
        self,
        baseline: Snapshot,
        events: mpsc::Sender<ChangeEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut previous = baseline;
        info!(
            "Watching {} files, polling every {:?}",
            previous.len(),
            self.poll_interval
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Watcher shutting down");
                        break;
                    }
                    continue;
                }
            }

            let current = match self.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Failed to poll tracked files: {}", e);
                    continue;
                }
            };

            let event = diff(&previous, &current);
            previous = current;
            if event.is_empty() {
                continue;
            }

            debug!("Detected {} changed files", event.changes.len());
            if events.send(event).await.is_err() {
                debug!("Change receiver dropped, stopping watcher");
                break;
            }
        }
    }
}
