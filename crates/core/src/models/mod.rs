//! # 数据模型
//!
//! 定义患者队列与救护车调度引擎的核心数据结构。
//!
//! ## 核心模型
//!
//! ### QueueEntry - 队列记录
//! 一位患者在一位医生队列中针对一次预约的记录，包含优先级类别、分数和状态。
//!
//! ### Appointment - 预约
//! 预约的排期数据，并镜像队列状态用于报表。每个预约至多对应一条队列记录。
//!
//! ### GeoNode - 路网节点
//! 带安全系数的地理点。司机、患者、医院三个角色节点始终存在，其余为途经点。
//!
//! ### Route - 调度路线
//! 两段路径（司机→患者、患者→医院）以及总距离和预计用时。
//!
//! ## 状态流转
//!
//! ```text
//! Waiting → Called → Completed
//!    ↓        ↓
//!  Missed   Skipped / Declined
//! ```
//!
//! 所有时间字段使用 `DateTime<Utc>`，所有枚举以小写形式序列化。

pub mod emergency;
pub mod geo;
pub mod patient;
pub mod queue;
pub mod route;

pub use emergency::*;
pub use geo::*;
pub use patient::*;
pub use queue::*;
pub use route::*;
