use std::sync::atomic::{AtomicU64, Ordering};

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;


/// CRUD and lookup tests for `services`
pub mod service_tests;


/// Database tests need a reachable PostgreSQL; they return early otherwise.
pub(crate) fn db_tests_enabled() -> bool {
    std::env::var("SKIP_DB_TESTS").is_err() && std::env::var("DATABASE_URL").is_ok()
}

/// Migrations run once per test binary; parallel `up` calls race on the bookkeeping table.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    Ok(db)
}

/// Unique suffix so concurrently running tests never share rows.
pub(crate) fn unique(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{prefix}_{}_{nanos}_{n}", std::process::id())
}
