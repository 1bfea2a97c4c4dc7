pub mod config;
pub mod errors;
pub mod models;

pub use config::{AppConfig, ApiConfig, ObservabilityConfig, QueueConfig, RoutingConfig};
pub use errors::*;
pub use models::*;
