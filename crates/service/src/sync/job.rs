use std::sync::Arc;

use async_trait::async_trait;
use common::http_client::{FetchError, HttpClient};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::about_us::repository::AboutUsRepository;
use crate::errors::ServiceError;
use crate::services::repository::ServiceRepository;
use crate::sync::record::{classify_about_us, RemoteRecord};

pub const SERVICES: &str = "services";
pub const ABOUT_US: &str = "about-us";

/// Anything that can hand back a remote collection payload.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<Map<String, Value>, FetchError>;
}

#[async_trait]
impl RemoteSource for HttpClient {
    async fn fetch(&self, endpoint: &str) -> Result<Map<String, Value>, FetchError> {
        self.get(endpoint).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Record failed validation and never reached a repository.
    Invalid(String),
    /// Repository call failed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    Updated,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: &'static str,
    pub outcomes: Vec<RecordOutcome>,
}

impl CollectionReport {
    pub fn new(collection: &'static str) -> Self { Self { collection, outcomes: Vec::new() } }

    pub fn inserted(&self) -> usize { self.count(|o| matches!(o, RecordOutcome::Inserted)) }
    pub fn updated(&self) -> usize { self.count(|o| matches!(o, RecordOutcome::Updated)) }
    pub fn invalid(&self) -> usize { self.count(|o| matches!(o, RecordOutcome::Skipped(SkipReason::Invalid(_)))) }
    pub fn failed(&self) -> usize { self.count(|o| matches!(o, RecordOutcome::Skipped(SkipReason::Failed(_)))) }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("unexpected payload for {collection}: {reason}")]
    Payload { collection: &'static str, reason: String },
}

#[derive(Debug)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub services: Result<CollectionReport, SyncError>,
    pub about_us: Result<CollectionReport, SyncError>,
}

impl SyncReport {
    pub fn all_collections_ok(&self) -> bool { self.services.is_ok() && self.about_us.is_ok() }
}

/// Pulls both remote collections into the local store.
pub struct SyncJob<S: RemoteSource, SR: ServiceRepository, AR: AboutUsRepository> {
    source: Arc<S>,
    services: Arc<SR>,
    about_us: Arc<AR>,
    run_id: Uuid,
}

impl<S: RemoteSource, SR: ServiceRepository, AR: AboutUsRepository> SyncJob<S, SR, AR> {
    pub fn new(source: Arc<S>, services: Arc<SR>, about_us: Arc<AR>) -> Self {
        Self { source, services, about_us, run_id: Uuid::new_v4() }
    }

    pub fn run_id(&self) -> Uuid { self.run_id }

    /// Services first, then about-us. A failed collection does not stop the other.
    pub async fn run(&self) -> SyncReport {
        let span = info_span!("sync", run_id = %self.run_id);
        async {
            info!("Starting synchronization...");
            let services = self.sync_services().await;
            let about_us = self.sync_about_us().await;
            info!("Synchronization completed.");
            SyncReport { run_id: self.run_id, services, about_us }
        }
        .instrument(span)
        .await
    }

    pub async fn sync_services(&self) -> Result<CollectionReport, SyncError> {
        info!("Synchronizing services...");
        let result = self.import_services().await;
        log_summary(SERVICES, &result);
        result
    }

    async fn import_services(&self) -> Result<CollectionReport, SyncError> {
        let payload = self.source.fetch("/services").await?;
        let records = records_in(&payload, SERVICES, true)?;
        let mut report = CollectionReport::new(SERVICES);
        for record in &records {
            report.outcomes.push(self.sync_service(record).await);
        }
        Ok(report)
    }

    pub async fn sync_about_us(&self) -> Result<CollectionReport, SyncError> {
        info!("Synchronizing about us...");
        let result = self.import_about_us().await;
        log_summary(ABOUT_US, &result);
        result
    }

    async fn import_about_us(&self) -> Result<CollectionReport, SyncError> {
        let payload = self.source.fetch("/about-us").await?;
        let records = records_in(&payload, ABOUT_US, false)?;
        let mut report = CollectionReport::new(ABOUT_US);
        for record in &records {
            report.outcomes.push(self.sync_about_us_item(record).await);
        }
        Ok(report)
    }

    async fn sync_service(&self, value: &Value) -> RecordOutcome {
        let record = match RemoteRecord::parse(value) {
            Ok(r) => r,
            Err(reason) => {
                warn!(collection = SERVICES, %reason, record = %value, "Invalid data structure for service");
                return RecordOutcome::Skipped(SkipReason::Invalid(reason));
            }
        };
        match self.upsert_service(&record).await {
            Ok(outcome) => {
                let verb = if outcome == RecordOutcome::Inserted { "Inserted" } else { "Updated" };
                info!(collection = SERVICES, remote_id = ?record.remote_id, "{} service: {}", verb, record.title);
                outcome
            }
            Err(e) => {
                error!(collection = SERVICES, remote_id = ?record.remote_id, name = %record.title, error = %e, "Error processing service");
                RecordOutcome::Skipped(SkipReason::Failed(e.to_string()))
            }
        }
    }

    async fn upsert_service(&self, record: &RemoteRecord) -> Result<RecordOutcome, ServiceError> {
        let Some(remote_id) = record.remote_id.as_deref() else {
            self.services.create(None, &record.title, &record.description).await?;
            return Ok(RecordOutcome::Inserted);
        };
        match self.services.get_by_external_id(remote_id).await? {
            Some(existing) => {
                self.services.update(existing.id, &record.title, &record.description).await?;
                Ok(RecordOutcome::Updated)
            }
            None => {
                self.services.create(Some(remote_id), &record.title, &record.description).await?;
                Ok(RecordOutcome::Inserted)
            }
        }
    }

    async fn sync_about_us_item(&self, value: &Value) -> RecordOutcome {
        let record = match RemoteRecord::parse(value) {
            Ok(r) => r,
            Err(reason) => {
                warn!(collection = ABOUT_US, %reason, record = %value, "Invalid data structure for about us");
                return RecordOutcome::Skipped(SkipReason::Invalid(reason));
            }
        };
        let kind = classify_about_us(&record.title);
        match self.upsert_about_us(&record, kind.as_str()).await {
            Ok(outcome) => {
                let verb = if outcome == RecordOutcome::Inserted { "Inserted" } else { "Updated" };
                info!(collection = ABOUT_US, kind = %kind, "{} about us: {}", verb, record.title);
                outcome
            }
            Err(e) => {
                error!(collection = ABOUT_US, title = %record.title, error = %e, "Error processing about us item");
                RecordOutcome::Skipped(SkipReason::Failed(e.to_string()))
            }
        }
    }

    async fn upsert_about_us(&self, record: &RemoteRecord, kind: &str) -> Result<RecordOutcome, ServiceError> {
        match self.about_us.get_by_title(&record.title).await? {
            Some(existing) => {
                self.about_us.update(existing.id, &record.title, &record.description, kind).await?;
                Ok(RecordOutcome::Updated)
            }
            None => {
                self.about_us.create(&record.title, &record.description, kind).await?;
                Ok(RecordOutcome::Inserted)
            }
        }
    }
}

/// Records under `data`. With `missing_is_empty`, an absent or null `data` is an empty collection.
fn records_in(payload: &Map<String, Value>, collection: &'static str, missing_is_empty: bool) -> Result<Vec<Value>, SyncError> {
    match payload.get("data") {
        Some(Value::Array(items)) => Ok(items.clone()),
        None | Some(Value::Null) if missing_is_empty => {
            warn!(collection, "response carries no data, nothing to import");
            Ok(Vec::new())
        }
        None => Err(SyncError::Payload { collection, reason: "missing data".into() }),
        Some(other) => Err(SyncError::Payload { collection, reason: format!("data is not an array: {}", type_name(other)) }),
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn log_summary(collection: &'static str, result: &Result<CollectionReport, SyncError>) {
    match result {
        Ok(r) => info!(
            collection,
            inserted = r.inserted(),
            updated = r.updated(),
            invalid = r.invalid(),
            failed = r.failed(),
            "{} synchronized: {} inserted, {} updated, {} skipped",
            collection,
            r.inserted(),
            r.updated(),
            r.invalid() + r.failed()
        ),
        Err(e) => error!(collection, error = %e, "General error in {} synchronization", collection),
    }
}
