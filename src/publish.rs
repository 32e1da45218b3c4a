//! Last-known-good publication of the version map

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::aggregate::{AggregateError, PackageVersionAggregator, VersionMap};
use crate::source::FileSource;

/// Holds the most recent successfully resolved [`VersionMap`].
///
/// The published value is replaced as a whole, so readers see either the
/// previous map or the new one, never a partially built map. A failed
/// refresh leaves the previous map in place.
#[derive(Debug)]
pub struct VersionStore {
    sender: watch::Sender<Option<Arc<VersionMap>>>,
}

impl VersionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Snapshot of the last-known-good map, if any pass has succeeded yet
    pub fn current(&self) -> Option<Arc<VersionMap>> {
        self.sender.borrow().clone()
    }

    /// Subscribe to replacements of the published map
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<VersionMap>>> {
        self.sender.subscribe()
    }

    /// Replace the published map
    pub fn publish(&self, versions: VersionMap) -> Arc<VersionMap> {
        let versions = Arc::new(versions);
        self.sender.send_replace(Some(Arc::clone(&versions)));
        versions
    }

    /// Run one aggregation pass and publish its result on success
    pub async fn refresh<S: FileSource>(
        &self,
        aggregator: &PackageVersionAggregator<S>,
    ) -> Result<Arc<VersionMap>, AggregateError> {
        match aggregator.resolve().await {
            Ok(versions) => {
                let versions = self.publish(versions);
                info!("Published {} package versions", versions.len());
                Ok(versions)
            }
            Err(e) => {
                if self.current().is_some() {
                    error!("Aggregation failed, keeping last-known-good versions: {}", e);
                } else {
                    error!("Aggregation failed, no versions published yet: {}", e);
                }
                Err(e)
            }
        }
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new()
    }
}
