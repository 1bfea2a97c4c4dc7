//! 配置管理
//!
//! 配置按以下顺序叠加：结构体默认值 → TOML 配置文件 → `TRIAGE_` 前缀的环境变量。
//! 所有隐式默认值（默认年龄、城市中心坐标、默认途经点）都在这里以命名常量给出，
//! 业务代码只在调用点读取配置，不在评分或路径逻辑内部代入默认值。
//!
//! ```toml
//! [api]
//! bind_address = "0.0.0.0:8080"
//!
//! [queue]
//! default_age = 30
//! minutes_per_patient = 10
//! missed_grace_minutes = 15
//!
//! [[queue.doctors]]
//! id = 1
//! name = "Dr. Rao"
//! department = "cardiology"
//!
//! [routing]
//! max_connection_radius_km = 5.0
//! average_speed_kmh = 40.0
//!
//! [[routing.waypoints]]
//! id = "mg_road"
//! lat = 12.9756
//! lng = 77.6066
//! safety_factor = 1.0
//! ```

pub mod models;

pub use models::*;
