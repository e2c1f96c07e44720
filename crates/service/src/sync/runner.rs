use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use common::{HttpClient, RetryPolicy};
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use tracing::{info, warn};

use crate::about_us::repository::SeaOrmAboutUsRepository;
use crate::services::repository::SeaOrmServiceRepository;
use crate::sync::job::{SyncJob, SyncReport};

/// Connect, take the run lock, migrate and import both collections.
///
/// Errors only for failures outside the collections themselves: connection,
/// lock contention, migration or HTTP client setup. A run that loses the lock
/// touches nothing, not even the schema.
pub async fn run_from_config(cfg: &AppConfig) -> anyhow::Result<SyncReport> {
    // Session advisory locks live on one physical connection.
    let mut db_cfg = cfg.database.clone();
    db_cfg.max_connections = 1;
    db_cfg.min_connections = 1;
    let db = models::db::connect_with_config(&db_cfg)
        .await
        .context("connecting to database")?;

    let key = cfg.sync.lock_key;
    if !models::db::try_advisory_lock(&db, key).await? {
        bail!("another synchronization run is in progress (lock {})", key);
    }
    info!(lock_key = key, "sync lock acquired");

    if let Err(e) = Migrator::up(&db, None).await {
        release(&db, key).await;
        return Err(e).context("running migrations");
    }

    let client = HttpClient::new(
        &cfg.sync.base_url,
        &cfg.sync.token,
        Duration::from_secs(cfg.sync.timeout_secs),
        RetryPolicy::new(
            cfg.sync.max_attempts,
            Duration::from_millis(cfg.sync.backoff_base_ms),
            Duration::from_millis(cfg.sync.backoff_max_ms),
            true,
        ),
    );
    let client = match client {
        Ok(c) => c,
        Err(e) => {
            release(&db, key).await;
            return Err(e).context("building HTTP client");
        }
    };

    let job = SyncJob::new(
        Arc::new(client),
        Arc::new(SeaOrmServiceRepository { db: db.clone() }),
        Arc::new(SeaOrmAboutUsRepository { db: db.clone() }),
    );
    let report = job.run().await;
    release(&db, key).await;
    Ok(report)
}

async fn release(db: &sea_orm::DatabaseConnection, key: i64) {
    if let Err(e) = models::db::advisory_unlock(db, key).await {
        warn!(lock_key = key, error = %e, "failed to release sync lock");
    }
}
