//! 基础设施层
//!
//! 领域端口的进程内实现：内存仓储、原子路况存储与 broadcast 事件通道。

pub mod broadcaster;
pub mod repositories;
pub mod road_conditions;

pub use broadcaster::ChannelBroadcaster;
pub use repositories::*;
pub use road_conditions::InMemoryRoadConditions;
