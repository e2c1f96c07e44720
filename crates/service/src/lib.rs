//! Service layer: repositories, pass-through services and the remote sync job.
//! - Repositories hide SeaORM behind traits so services and the sync job can run on mocks.
//! - Entity definitions and queries live in the `models` crate.

pub mod about_us;
pub mod errors;
pub mod services;
pub mod sync;

pub use errors::ServiceError;
