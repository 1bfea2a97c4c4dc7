use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GeoPoint, Route};

/// 急救请求状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyStatus {
    Pending,
    Accepted,
    Completed,
}

/// 急救请求
///
/// 接单时附上计算好的路线，之后的重新计算会整体替换该路线。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyRequest {
    pub id: i64,
    pub patient_id: i64,
    pub pickup_location: GeoPoint,
    pub status: EmergencyStatus,
    pub driver_id: Option<i64>,
    pub hospital_location: Option<GeoPoint>,
    pub route: Option<Route>,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl EmergencyRequest {
    pub fn new(patient_id: i64, pickup_location: GeoPoint) -> Self {
        Self {
            id: 0,
            patient_id,
            pickup_location,
            status: EmergencyStatus::Pending,
            driver_id: None,
            hospital_location: None,
            route: None,
            created_at: Utc::now(),
            accepted_at: None,
        }
    }
}
