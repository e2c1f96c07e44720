use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter, Layer};

const DEFAULT_DIRECTIVES: &str = "info,tower_http=info,axum=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,axum=info`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// Initialize tracing subscriber with JSON structured output on stdout.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .json()
        .with_writer(io::stdout)
        .try_init();
}

/// Keeps the non-blocking file writers alive. Dropping it flushes pending lines,
/// so hold it until the process is about to exit.
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initialize stdout logging plus two plain-text files under `dir`:
/// `app.log` receives every event that passes the env filter, `errors_file`
/// receives warnings and errors only. The directory is created if missing.
/// `json` picks the stdout format; the files are always plain text.
pub fn init_logging_with_files(dir: impl AsRef<Path>, errors_file: &str, json: bool) -> anyhow::Result<LogGuard> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("cannot create log dir {}: {e}", dir.display()))?;

    let (app_writer, app_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "app.log"));
    let (err_writer, err_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, errors_file));

    let stdout_json = json.then(|| fmt::layer().with_target(false).json().with_writer(io::stdout));
    let stdout_compact = (!json).then(|| fmt::layer().with_target(false).compact().with_writer(io::stdout));
    let app = fmt::layer().with_ansi(false).with_writer(app_writer);
    let errors = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(err_writer)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_json)
        .with(stdout_compact)
        .with(app)
        .with(errors)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger already initialized: {e}"))?;

    Ok(LogGuard { _guards: vec![app_guard, err_guard] })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this crate that installs a global subscriber.
    #[test]
    fn file_sinks_split_by_level() {
        let dir = std::env::temp_dir().join(format!("coningenio-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let guard = init_logging_with_files(&dir, "server_errors.log", false).unwrap();
        tracing::info!("routine line for app log");
        tracing::warn!("upstream went away");
        drop(guard);

        let app = std::fs::read_to_string(dir.join("app.log")).unwrap();
        let errors = std::fs::read_to_string(dir.join("server_errors.log")).unwrap();
        assert!(app.contains("routine line for app log"));
        assert!(app.contains("upstream went away"));
        assert!(errors.contains("upstream went away"));
        assert!(!errors.contains("routine line for app log"));

        assert!(init_logging_with_files(&dir, "again.log", true).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
