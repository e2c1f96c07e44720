//! One-shot import of the remote `services` and `about-us` collections.
//!
//! Each collection is fetched whole, every record is validated and upserted
//! independently, and the outcome of every record is folded into a
//! [`CollectionReport`].

pub mod job;
pub mod record;
pub mod runner;

pub use job::{CollectionReport, RecordOutcome, RemoteSource, SkipReason, SyncError, SyncJob, SyncReport};
pub use record::{classify_about_us, RemoteRecord};
pub use runner::run_from_config;
