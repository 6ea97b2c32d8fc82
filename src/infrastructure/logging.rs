// Tracing setup: a daily log file under the configured directory
use crate::infrastructure::config::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::daily;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "node-dashboard.log";

/// `RUST_LOG` wins over the configured level. Keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&settings.directory)?;
    let (writer, guard) = tracing_appender::non_blocking(daily(&settings.directory, LOG_FILE_PREFIX));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&settings.level).unwrap_or_else(|err| {
            eprintln!("invalid log level {:?} ({}); using info", settings.level, err);
            EnvFilter::new("info")
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!(log_dir = %settings.directory.display(), "Tracing initialised");
    Ok(guard)
}
