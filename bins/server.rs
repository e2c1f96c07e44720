use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::utils::logging::LogGuard;

const ERRORS_LOG: &str = "server_errors.log";

/// File sinks under `logging.dir`; stdout only if the directory is unusable.
fn init_logging(cfg: &AppConfig) -> Option<LogGuard> {
    match common::utils::logging::init_logging_with_files(&cfg.logging.dir, ERRORS_LOG, cfg.logging.json) {
        Ok(guard) => {
            info!(service = "server", event = "logger_init", dir = %cfg.logging.dir, "tracing subscriber initialized");
            Some(guard)
        }
        Err(e) => {
            if cfg.logging.json {
                common::utils::logging::init_logging_json();
            } else {
                common::utils::logging::init_logging_default();
            }
            warn!(service = "server", error = %e, "file logging unavailable, logging to stdout only");
            None
        }
    }
}

fn main() -> std::process::ExitCode {
    // Load .env first so RUST_LOG and DATABASE_URL take effect.
    dotenv().ok();

    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    // Held until exit so buffered file lines are flushed.
    let _log_guard = init_logging(&cfg);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server service starting"
    );

    // `server::run` stops on Ctrl+C through graceful shutdown.
    rt.block_on(async move {
        match tokio::spawn(server::run(cfg)).await {
            Ok(Ok(())) => {
                info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = "server", event = "run_failed", error = ?e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = "server", event = "task_join_error", error = %e, "server task join error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
