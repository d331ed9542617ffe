pub mod config;
pub mod error;
pub mod types;

pub use config::{FeedConfig, ServiceConfig};
pub use error::ServiceError;
pub use types::now_millis;
