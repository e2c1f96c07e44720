pub mod repository;
pub mod service;

pub use repository::{AboutUsRepository, SeaOrmAboutUsRepository};
pub use service::AboutUsService;
