//! Watch mode: change detection driving serialized rebuilds

mod helper;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use helper::PackageTree;
use package_versions::aggregate::{AggregateError, VersionMap};
use package_versions::publish::VersionStore;
use package_versions::rebuild::{RebuildOutcome, RebuildScheduler, RebuildTrigger};
use package_versions::watch::{ChangeEvent, ChangeWatcher};

struct LiveRebuild {
    store: Arc<VersionStore>,
    trigger: RebuildTrigger,
    events: mpsc::Receiver<ChangeEvent>,
    outcomes: mpsc::UnboundedReceiver<RebuildOutcome>,
    shutdown: watch::Sender<bool>,
}

impl LiveRebuild {
    /// Take the watcher baseline, then request the initial build
    async fn start(tree: &PackageTree) -> Self {
        let aggregator = Arc::new(tree.aggregator());
        let store = Arc::new(VersionStore::new());

        let watcher = ChangeWatcher::new(
            Arc::clone(aggregator.source()),
            Duration::from_millis(20),
        );
        let baseline = watcher.baseline().await;

        let (outcomes_tx, outcomes) = mpsc::unbounded_channel();
        let (trigger, _scheduler) =
            RebuildScheduler::new(Arc::clone(&aggregator), Arc::clone(&store))
                .spawn(Some(outcomes_tx));
        trigger.request();

        let (events_tx, events) = mpsc::channel(16);
        let (shutdown, shutdown_rx) = watch::channel(false);
        tokio::spawn(watcher.run(baseline, events_tx, shutdown_rx));

        Self {
            store,
            trigger,
            events,
            outcomes,
            shutdown,
        }
    }

    /// Forward change events to the scheduler until the next pass completes
    async fn next_outcome(&mut self) -> RebuildOutcome {
        let wait = async {
            loop {
                tokio::select! {
                    Some(event) = self.events.recv() => {
                        self.trigger.notify(&event);
                    }
                    Some(outcome) = self.outcomes.recv() => return outcome,
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("timed out waiting for rebuild")
    }

    /// Skip failed passes, which a watcher may observe while a file is half written
    async fn next_published(&mut self) -> Arc<VersionMap> {
        loop {
            if let RebuildOutcome::Published(versions) = self.next_outcome().await {
                return versions;
            }
        }
    }
}

impl Drop for LiveRebuild {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn rebuilds_after_file_changes() {
    let tree = PackageTree::new();
    tree.add_package("a", "alpha", "1.2.0")
        .add_package("b", "beta", "0.9.3");
    let mut live = LiveRebuild::start(&tree).await;

    let RebuildOutcome::Published(initial) = live.next_outcome().await else {
        panic!("initial build failed");
    };
    assert_eq!(initial.len(), 2);

    // Deletion removes the package
    tree.remove("packages/b/config.toml");
    let RebuildOutcome::Published(after_delete) = live.next_outcome().await else {
        panic!("rebuild after deletion failed");
    };
    assert!(!after_delete.contains("beta"));
    assert_eq!(after_delete.get("alpha"), Some("1.2.0"));

    // A malformed file fails the pass and keeps the last-known-good map
    tree.write("packages/a/config.toml", "name = \"alpha\"\n");
    let RebuildOutcome::Failed(err) = live.next_outcome().await else {
        panic!("malformed file was accepted");
    };
    assert!(matches!(
        err,
        AggregateError::MissingField { .. } | AggregateError::Parse { .. }
    ));
    assert_eq!(live.store.current(), Some(after_delete));

    // Fixing the file recovers
    tree.add_package("a", "alpha", "1.3.0");
    let recovered = live.next_published().await;
    assert_eq!(recovered.get("alpha"), Some("1.3.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn new_package_directory_is_picked_up() {
    let tree = PackageTree::new();
    tree.add_package("a", "alpha", "1.2.0");
    let mut live = LiveRebuild::start(&tree).await;

    assert!(matches!(
        live.next_outcome().await,
        RebuildOutcome::Published(_)
    ));

    tree.add_package("c", "gamma", "3.0.0");

    let versions = live.next_published().await;
    assert_eq!(versions.get("gamma"), Some("3.0.0"));
    assert_eq!(versions.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn change_during_initial_build_is_published() {
    let tree = PackageTree::new();
    tree.add_package("a", "alpha", "1.2.0");
    let mut live = LiveRebuild::start(&tree).await;

    // Races the initial pass: either it or a follow-up pass sees the edit
    tree.add_package("a", "alpha", "1.3.0");

    loop {
        let versions = live.next_published().await;
        if versions.get("alpha") == Some("1.3.0") {
            break;
        }
        assert_eq!(versions.get("alpha"), Some("1.2.0"));
    }
    assert_eq!(
        live.store.current().and_then(|v| v.get("alpha").map(str::to_string)),
        Some("1.3.0".to_string())
    );
}
