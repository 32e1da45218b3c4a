use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use package_versions::aggregate::{
    AggregateError, DuplicatePolicy, PackageVersionAggregator, VersionMap,
};
use package_versions::config::{self, AggregatorConfig, ConfigError};
use package_versions::logging::{self, LogOptions};
use package_versions::output::write_version_map;
use package_versions::parser::ConfigFormat;
use package_versions::publish::VersionStore;
use package_versions::rebuild::{RebuildOutcome, RebuildScheduler};
use package_versions::source::FsSource;
use package_versions::watch::ChangeWatcher;

#[derive(Parser)]
#[command(name = "package-versions")]
#[command(version, about = "Aggregate package versions for documentation builds")]
struct Cli {
    /// Config file (default: package-versions.toml in the root, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the patterns are relative to
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Glob pattern selecting package config files (repeatable)
    #[arg(long = "pattern", global = true)]
    patterns: Vec<String>,

    /// Parse every file with this format instead of detecting it by extension
    #[arg(long, global = true, value_enum)]
    format: Option<ConfigFormat>,

    /// How to treat two files declaring the same package name
    #[arg(long, global = true, value_enum)]
    duplicates: Option<DuplicatePolicy>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to a file instead of stderr (default: the data directory)
    #[arg(long, global = true, num_args = 0..=1, value_name = "FILE")]
    log_file: Option<Option<PathBuf>>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve once and print or write the version map
    Resolve {
        /// Write the map to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve, then resolve again whenever a tracked file changes
    Watch {
        /// Write the map to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Interval between two change polls
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|file| file.unwrap_or_else(config::log_path));
    let _guard = match logging::init(LogOptions {
        verbose: cli.verbose,
        json: cli.json_logs,
        file: log_file.as_deref(),
    }) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: failed to initialize logging: {e}");
            return ExitCode::from(2);
        }
    };

    let result = build_config(&cli).map_err(anyhow::Error::from).and_then(|config| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start runtime")?
            .block_on(run(cli.command, config))
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}

/// Merge defaults, the config file and command-line flags, in that order
fn build_config(cli: &Cli) -> Result<AggregatorConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AggregatorConfig::load(path)?;
            if let Some(root) = &cli.root {
                config.root = root.clone();
            }
            config
        }
        None => AggregatorConfig::discover(cli.root.as_deref().unwrap_or(Path::new(".")))?,
    };

    if !cli.patterns.is_empty() {
        config.patterns = cli.patterns.clone();
    }
    if cli.format.is_some() {
        config.format = cli.format;
    }
    if let Some(duplicates) = cli.duplicates {
        config.duplicates = duplicates;
    }
    match &cli.command {
        Command::Resolve { output } => {
            if output.is_some() {
                config.output = output.clone();
            }
        }
        Command::Watch {
            output,
            poll_interval_ms,
        } => {
            if output.is_some() {
                config.output = output.clone();
            }
            if let Some(ms) = poll_interval_ms {
                config.watch.poll_interval_ms = *ms;
            }
        }
    }

    config.validate()?;
    Ok(config)
}

fn build_aggregator(
    config: &AggregatorConfig,
) -> Result<PackageVersionAggregator<FsSource>, ConfigError> {
    let source = FsSource::new(&config.root, config.pattern_set()?);
    Ok(PackageVersionAggregator::new(Arc::new(source))
        .with_format(config.format)
        .with_duplicate_policy(config.duplicates))
}

async fn run(command: Command, config: AggregatorConfig) -> anyhow::Result<()> {
    info!("Tracking {:?} under {:?}", config.patterns, config.root);
    match command {
        Command::Resolve { .. } => run_resolve(config).await,
        Command::Watch { .. } => run_watch(config).await,
    }
}

async fn emit(config: &AggregatorConfig, versions: &VersionMap) -> anyhow::Result<()> {
    match &config.output {
        Some(path) => write_version_map(path, versions)
            .await
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", versions.to_json_pretty());
            Ok(())
        }
    }
}

async fn run_resolve(config: AggregatorConfig) -> anyhow::Result<()> {
    let aggregator = build_aggregator(&config)?;
    let store = VersionStore::new();
    let versions = store.refresh(&aggregator).await?;
    emit(&config, &versions).await
}

fn report_failure(e: &AggregateError) {
    match e.path() {
        Some(path) => eprintln!("error in {}: {e}", path.display()),
        None => eprintln!("error: {e}"),
    }
}

async fn run_watch(config: AggregatorConfig) -> anyhow::Result<()> {
    let aggregator = Arc::new(build_aggregator(&config)?);
    let store = Arc::new(VersionStore::new());

    let watcher = ChangeWatcher::new(
        Arc::clone(aggregator.source()),
        config.watch.poll_interval(),
    );
    // Any change after this point is reported by the first poll
    let baseline = watcher.baseline().await;

    let (outcomes_tx, mut outcomes) = mpsc::unbounded_channel();
    let (trigger, scheduler) = RebuildScheduler::new(Arc::clone(&aggregator), Arc::clone(&store))
        .spawn(Some(outcomes_tx));
    trigger.request();

    let (events_tx, mut events) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher = tokio::spawn(watcher.run(baseline, events_tx, shutdown_rx));

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                trigger.notify(&event);
            }
            Some(outcome) = outcomes.recv() => match outcome {
                RebuildOutcome::Published(versions) => {
                    if let Err(e) = emit(&config, &versions).await {
                        error!("{:#}", e);
                        eprintln!("error: {e:#}");
                    }
                }
                RebuildOutcome::Failed(e) => report_failure(&e),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                info!("Shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    drop(trigger);
    watcher.await.context("watcher task failed")?;
    scheduler.await.context("rebuild task failed")?;
    Ok(())
}
