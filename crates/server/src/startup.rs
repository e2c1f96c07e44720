use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use configs::{AppConfig, ServerConfig};
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use service::about_us::{AboutUsRepository, AboutUsService, SeaOrmAboutUsRepository};
use service::services::{SeaOrmServiceRepository, ServiceRepository, ServiceService};
use tracing::info;

use crate::errors::StartupError;
use crate::router::RouteError;
use crate::routes;

/// Build the application over any pair of repositories.
pub fn app<SR, AR>(services: Arc<SR>, about_us: Arc<AR>) -> Result<Router, RouteError>
where
    SR: ServiceRepository + 'static,
    AR: AboutUsRepository + 'static,
{
    let api = routes::build_api_router(
        Arc::new(ServiceService::new(services)),
        Arc::new(AboutUsService::new(about_us)),
    )?;
    info!(routes = api.len(), "path router ready");
    Ok(routes::build_router(api))
}

pub fn app_with_db(db: DatabaseConnection) -> Result<Router, RouteError> {
    app(
        Arc::new(SeaOrmServiceRepository { db: db.clone() }),
        Arc::new(SeaOrmAboutUsRepository { db }),
    )
}

fn bind_addr(cfg: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {}", cfg.host, cfg.port, e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Connect, migrate and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg.server)?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .context("connecting to database")?;
    Migrator::up(&db, None).await.context("running migrations")?;

    let app = app_with_db(db).map_err(StartupError::from)?;

    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
