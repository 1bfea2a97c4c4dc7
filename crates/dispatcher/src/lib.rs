//! 调度引擎
//!
//! 门诊队列的优先级评分、排序、停诊转移，以及救护车路线的构图与最短路径计算。
//! 核心算法是同步的纯计算，服务层在其上编排仓储与事件发布。

pub mod dispatch_service;
pub mod ordering;
pub mod priority;
pub mod queue_service;
pub mod reassign;
pub mod road_graph;
pub mod route_optimizer;
pub mod shortest_path;

pub use dispatch_service::*;
pub use ordering::QueueOrderer;
pub use priority::{PriorityAssessment, PriorityScorer};
pub use queue_service::*;
pub use reassign::{QueueReassigner, ReassignmentStrategy, SameDepartmentStrategy};
pub use road_graph::RoadGraph;
pub use route_optimizer::RouteOptimizer;
pub use shortest_path::ShortestPathEngine;
