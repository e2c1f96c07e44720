pub mod repository;
pub mod service;

pub use repository::{SeaOrmServiceRepository, ServiceRepository};
pub use service::ServiceService;
