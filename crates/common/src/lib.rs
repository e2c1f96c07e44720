pub mod types;
pub mod utils;
pub mod retry;
pub mod http_client;

pub use http_client::{FetchError, HttpClient};
pub use retry::RetryPolicy;
