use serde::{Deserialize, Serialize};

use crate::{TriageError, TriageResult};

/// 地球平均半径（公里）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// 中性安全系数
pub const NEUTRAL_SAFETY_FACTOR: f64 = 1.0;

pub const DRIVER_NODE_ID: &str = "driver";
pub const PATIENT_NODE_ID: &str = "patient";
pub const HOSPITAL_NODE_ID: &str = "hospital";

/// 经纬度坐标
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn validate(&self) -> TriageResult<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(TriageError::invalid_input(format!(
                "纬度超出范围: {}",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(TriageError::invalid_input(format!(
                "经度超出范围: {}",
                self.lng
            )));
        }
        Ok(())
    }

    /// 半正矢公式计算的大圆距离（公里）
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

/// 路网节点
///
/// `safety_factor` 大于 1 表示该路段有额外风险或拥堵，小于 1 表示更通畅，
/// 必须为正数，否则边权的大小关系会被破坏。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoNode {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub safety_factor: f64,
}

impl GeoNode {
    pub fn new(id: impl Into<String>, point: GeoPoint, safety_factor: f64) -> TriageResult<Self> {
        let node = Self {
            id: id.into(),
            lat: point.lat,
            lng: point.lng,
            safety_factor,
        };
        node.validate()?;
        Ok(node)
    }

    /// 以中性安全系数创建节点，用于司机、患者、医院三个固定角色
    pub fn neutral(id: impl Into<String>, point: GeoPoint) -> TriageResult<Self> {
        Self::new(id, point, NEUTRAL_SAFETY_FACTOR)
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn validate(&self) -> TriageResult<()> {
        if self.id.trim().is_empty() {
            return Err(TriageError::invalid_input("节点ID不能为空"));
        }
        self.point().validate()?;
        validate_safety_factor(self.safety_factor)
    }
}

pub fn validate_safety_factor(factor: f64) -> TriageResult<()> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(TriageError::invalid_input(format!(
            "安全系数必须为正数: {factor}"
        )));
    }
    Ok(())
}
