use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{
    DoctorAvailability, GeoNode, GeoPoint, DRIVER_NODE_ID, HOSPITAL_NODE_ID, PATIENT_NODE_ID,
};

/// 默认年龄：预约时未提供年龄则按此值评分
pub const DEFAULT_PATIENT_AGE: u32 = 30;
/// 每位排在前面的患者预计占用的分钟数
pub const DEFAULT_MINUTES_PER_PATIENT: u32 = 10;
pub const DEFAULT_MAX_CONNECTION_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub default_age: u32,
    pub minutes_per_patient: u32,
    /// 预约时间过后多少分钟仍未叫号则标记为过号
    pub missed_grace_minutes: i64,
    pub missed_sweep_interval_seconds: u64,
    /// 启动时载入的医生名册
    pub doctors: Vec<DoctorConfig>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_age: DEFAULT_PATIENT_AGE,
            minutes_per_patient: DEFAULT_MINUTES_PER_PATIENT,
            missed_grace_minutes: 15,
            missed_sweep_interval_seconds: 60,
            doctors: Vec::new(),
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_age > 150 {
            return Err(anyhow::anyhow!("默认年龄不合理: {}", self.default_age));
        }

        if self.missed_grace_minutes < 0 {
            return Err(anyhow::anyhow!("过号宽限期不能为负数"));
        }

        if self.missed_sweep_interval_seconds == 0 {
            return Err(anyhow::anyhow!("过号扫描间隔必须大于0"));
        }

        let mut seen = HashSet::new();
        for doctor in &self.doctors {
            if doctor.department.trim().is_empty() {
                return Err(anyhow::anyhow!("医生 {} 未设置科室", doctor.id));
            }
            if !seen.insert(doctor.id) {
                return Err(anyhow::anyhow!("医生ID重复: {}", doctor.id));
            }
        }

        Ok(())
    }
}

/// 医生名册条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorConfig {
    pub id: i64,
    pub name: String,
    pub department: String,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
}

fn available_by_default() -> bool {
    true
}

impl DoctorConfig {
    pub fn to_availability(&self) -> DoctorAvailability {
        DoctorAvailability {
            doctor_id: self.id,
            name: self.name.clone(),
            department: self.department.clone(),
            is_available: self.is_available,
        }
    }
}

/// 途经点配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaypointConfig {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "neutral_factor")]
    pub safety_factor: f64,
}

fn neutral_factor() -> f64 {
    crate::models::NEUTRAL_SAFETY_FACTOR
}

impl WaypointConfig {
    fn new(id: &str, lat: f64, lng: f64, safety_factor: f64) -> Self {
        Self {
            id: id.to_string(),
            lat,
            lng,
            safety_factor,
        }
    }

    pub fn to_node(&self) -> crate::TriageResult<GeoNode> {
        GeoNode::new(self.id.clone(), GeoPoint::new(self.lat, self.lng), self.safety_factor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub max_connection_radius_km: f64,
    pub average_speed_kmh: f64,
    /// 缺少司机或医院位置时使用的城市中心坐标
    pub default_location: GeoPoint,
    pub waypoints: Vec<WaypointConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_connection_radius_km: DEFAULT_MAX_CONNECTION_RADIUS_KM,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            default_location: GeoPoint::new(12.9716, 77.5946),
            waypoints: default_waypoints(),
        }
    }
}

/// 班加罗尔市中心的默认路网途经点
pub fn default_waypoints() -> Vec<WaypointConfig> {
    vec![
        WaypointConfig::new("mg_road", 12.9756, 77.6066, 1.0),
        WaypointConfig::new("cubbon_park", 12.9763, 77.5929, 0.9),
        WaypointConfig::new("shivajinagar", 12.9857, 77.6057, 1.3),
        WaypointConfig::new("richmond_circle", 12.9650, 77.5990, 1.1),
        WaypointConfig::new("majestic", 12.9767, 77.5713, 1.5),
        WaypointConfig::new("indiranagar", 12.9784, 77.6408, 1.0),
        WaypointConfig::new("koramangala", 12.9352, 77.6245, 1.2),
    ]
}

impl RoutingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.max_connection_radius_km.is_finite() || self.max_connection_radius_km <= 0.0 {
            return Err(anyhow::anyhow!("最大连接半径必须大于0"));
        }

        if !self.average_speed_kmh.is_finite() || self.average_speed_kmh <= 0.0 {
            return Err(anyhow::anyhow!("平均车速必须大于0"));
        }

        self.default_location
            .validate()
            .map_err(|e| anyhow::anyhow!("默认位置无效: {e}"))?;

        let reserved = [DRIVER_NODE_ID, PATIENT_NODE_ID, HOSPITAL_NODE_ID];
        let mut seen = HashSet::new();
        for waypoint in &self.waypoints {
            if reserved.contains(&waypoint.id.as_str()) {
                return Err(anyhow::anyhow!("途经点ID与保留角色冲突: {}", waypoint.id));
            }
            if !seen.insert(waypoint.id.as_str()) {
                return Err(anyhow::anyhow!("途经点ID重复: {}", waypoint.id));
            }
            waypoint
                .to_node()
                .map_err(|e| anyhow::anyhow!("途经点 {} 无效: {e}", waypoint.id))?;
        }

        Ok(())
    }
}
