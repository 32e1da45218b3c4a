//! Tracing subscriber setup for the command-line tool

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "PACKAGE_VERSIONS_LOG";

/// Logging options collected from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions<'a> {
    pub verbose: bool,
    pub json: bool,
    pub file: Option<&'a Path>,
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("package_versions=debug,warn")
        } else {
            EnvFilter::new("package_versions=info,warn")
        }
    })
}

/// Install the global subscriber.
///
/// Logs go to stderr so stdout stays free for the resolved map, or to
/// `options.file` when given. The returned guard flushes the file writer
/// on drop and must be kept alive for the lifetime of the program.
pub fn init(options: LogOptions<'_>) -> std::io::Result<Option<WorkerGuard>> {
    let (writer, guard) = match options.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(dir) = dir {
                std::fs::create_dir_all(dir)?;
            }
            let file_name = path.file_name().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("log file path has no file name: {}", path.display()),
                )
            })?;
            let appender =
                tracing_appender::rolling::never(dir.unwrap_or_else(|| Path::new(".")), file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer),
                Some(guard),
            )
        }
        None => (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        ),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(options.file.is_none())
        .with_target(false);

    let registry = tracing_subscriber::registry().with(env_filter(options.verbose));
    if options.json {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer.compact()).init();
    }

    Ok(guard)
}
