//! Serialized re-aggregation on change notifications

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregate::{AggregateError, PackageVersionAggregator, VersionMap};
use crate::publish::VersionStore;
use crate::source::FileSource;
use crate::watch::{ChangeEvent, ChangeKind};

/// Result of one rebuild pass
#[derive(Debug)]
pub enum RebuildOutcome {
    /// A new map replaced the published one
    Published(Arc<VersionMap>),
    /// The pass failed; the previously published map is still current
    Failed(AggregateError),
}

/// Handle used to request a rebuild
///
/// Requests are coalesced: while one rebuild is pending, further requests
/// are absorbed by it.
#[derive(Debug, Clone)]
pub struct RebuildTrigger {
    sender: mpsc::Sender<()>,
}

impl RebuildTrigger {
    /// Request a rebuild; returns false if the request was coalesced or the
    /// scheduler has stopped
    pub fn request(&self) -> bool {
        match self.sender.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                debug!("Rebuild already pending, coalescing request");
                false
            }
            Err(TrySendError::Closed(())) => false,
        }
    }

    /// Request a rebuild in response to a change notification
    pub fn notify(&self, event: &ChangeEvent) -> bool {
        for change in &event.changes {
            let verb = match change.kind {
                ChangeKind::Created => "created",
                ChangeKind::Modified => "modified",
                ChangeKind::Removed => "removed",
            };
            info!("{:?} {}", change.path, verb);
        }
        self.request()
    }
}

/// Runs aggregation passes one at a time.
///
/// At most one pass is in flight and at most one further pass is pending;
/// every pass is a full rebuild, so coalesced requests lose nothing.
pub struct RebuildScheduler<S: FileSource> {
    aggregator: Arc<PackageVersionAggregator<S>>,
    store: Arc<VersionStore>,
}

impl<S: FileSource + 'static> RebuildScheduler<S> {
    pub fn new(aggregator: Arc<PackageVersionAggregator<S>>, store: Arc<VersionStore>) -> Self {
        Self { aggregator, store }
    }

    /// Start the scheduler task
    ///
    /// The task ends once every [`RebuildTrigger`] has been dropped. Each
    /// pass outcome is sent to `outcomes` when given.
    pub fn spawn(
        self,
        outcomes: Option<mpsc::UnboundedSender<RebuildOutcome>>,
    ) -> (RebuildTrigger, JoinHandle<()>) {
        let (sender, mut requests) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            while requests.recv().await.is_some() {
                let outcome = match self.store.refresh(&self.aggregator).await {
                    Ok(versions) => RebuildOutcome::Published(versions),
                    Err(e) => RebuildOutcome::Failed(e),
                };

                if let Some(outcomes) = &outcomes
                    && outcomes.send(outcome).is_err()
                {
                    debug!("Rebuild outcome receiver dropped");
                }
            }
            debug!("Rebuild scheduler stopped");
        });

        (RebuildTrigger { sender }, handle)
    }
}
