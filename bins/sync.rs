use std::process::ExitCode;
use std::time::Duration;

use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info, warn};

const ERRORS_LOG: &str = "sync_errors.log";

fn main() -> ExitCode {
    dotenv().ok();

    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "sync", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so buffered file lines are flushed.
    let _log_guard = match common::utils::logging::init_logging_with_files(&cfg.logging.dir, ERRORS_LOG, cfg.logging.json) {
        Ok(guard) => Some(guard),
        Err(e) => {
            common::utils::logging::init_logging_default();
            warn!(service = "sync", error = %e, "file logging unavailable, logging to stdout only");
            None
        }
    };

    std::panic::set_hook(Box::new(|info| {
        error!(service = "sync", event = "panic", message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "sync", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let ceiling = Duration::from_secs(cfg.sync.max_runtime_secs);
    info!(service = "sync", event = "start", base_url = %cfg.sync.base_url, max_runtime_secs = cfg.sync.max_runtime_secs, "sync starting");

    rt.block_on(async move {
        match tokio::time::timeout(ceiling, service::sync::run_from_config(&cfg)).await {
            Ok(Ok(report)) => {
                if !report.all_collections_ok() {
                    warn!(service = "sync", run_id = %report.run_id, "synchronization finished with collection errors");
                }
                info!(service = "sync", event = "stop", run_id = %report.run_id, "sync finished");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = "sync", event = "run_failed", error = ?e, "Fatal error in synchronization");
                ExitCode::FAILURE
            }
            Err(_) => {
                error!(service = "sync", event = "timeout", max_runtime_secs = ceiling.as_secs(), "synchronization exceeded its time limit");
                ExitCode::FAILURE
            }
        }
    })
}
