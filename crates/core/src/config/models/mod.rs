pub mod api_observability;
pub mod app_config;
pub mod queue_routing;

// Re-export main types for easier imports
pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use queue_routing::{default_waypoints, DoctorConfig, QueueConfig, RoutingConfig, WaypointConfig};
