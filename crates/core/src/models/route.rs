use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 不可达时的距离哨兵值
pub const UNREACHABLE_DISTANCE: f64 = -1.0;

/// 单源最短路径结果
///
/// 终点不可达是正常结果而不是错误：`distance_km = -1`，`path` 为空。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathResult {
    pub distance_km: f64,
    pub path: Vec<String>,
}

impl PathResult {
    pub fn unreachable() -> Self {
        Self {
            distance_km: UNREACHABLE_DISTANCE,
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance_km >= 0.0
    }
}

/// 救护车调度路线：司机→患者、患者→医院两段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub to_patient: PathResult,
    pub to_hospital: PathResult,
    /// 任一段不可达时为 -1
    pub total_distance_km: f64,
    /// 任一段不可达时为 -1
    pub estimated_time_minutes: i64,
    pub computed_at: DateTime<Utc>,
}

impl Route {
    pub fn is_reachable(&self) -> bool {
        self.to_patient.is_reachable() && self.to_hospital.is_reachable()
    }
}
