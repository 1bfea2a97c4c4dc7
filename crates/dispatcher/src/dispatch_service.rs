use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use triage_core::models::{EmergencyRequest, EmergencyStatus, GeoNode, GeoPoint, PathResult, Route};
use triage_core::{RoutingConfig, TriageError, TriageResult};
use triage_domain::{
    DispatchBroadcaster, DispatchEvent, DomainEvent, EmergencyRepository, RoadConditionsStore,
};

use crate::route_optimizer::RouteOptimizer;

/// 接单请求，缺失的位置按约定回退
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAcceptRequest {
    pub driver_id: i64,
    #[serde(default)]
    pub driver_location: Option<GeoPoint>,
    #[serde(default)]
    pub pickup_location: Option<GeoPoint>,
    #[serde(default)]
    pub hospital_location: Option<GeoPoint>,
}

/// 临时路线计算请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub driver_location: GeoPoint,
    pub pickup_location: GeoPoint,
    pub hospital_location: GeoPoint,
    /// 缺失时使用当前路况快照，空数组表示不使用途经点
    #[serde(default)]
    pub waypoints: Option<Vec<GeoNode>>,
}

/// 单段路线摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegSummary {
    pub distance_km: f64,
    pub estimated_time_minutes: i64,
    pub reachable: bool,
}

/// 接单结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyDispatch {
    pub emergency_id: i64,
    pub route: Route,
    pub to_patient: LegSummary,
    pub to_hospital: LegSummary,
    pub route_available: bool,
}

/// 急救调度服务
pub struct DispatchService {
    emergency_repo: Arc<dyn EmergencyRepository>,
    road_conditions: Arc<dyn RoadConditionsStore>,
    broadcaster: Arc<dyn DispatchBroadcaster>,
    optimizer: RouteOptimizer,
    default_location: GeoPoint,
}

impl DispatchService {
    pub fn new(
        emergency_repo: Arc<dyn EmergencyRepository>,
        road_conditions: Arc<dyn RoadConditionsStore>,
        broadcaster: Arc<dyn DispatchBroadcaster>,
        config: &RoutingConfig,
    ) -> Self {
        Self {
            emergency_repo,
            optimizer: RouteOptimizer::new(Arc::clone(&road_conditions), config),
            road_conditions,
            broadcaster,
            default_location: config.default_location,
        }
    }

    pub async fn create_emergency(
        &self,
        patient_id: i64,
        pickup_location: GeoPoint,
    ) -> TriageResult<EmergencyRequest> {
        pickup_location.validate()?;
        let request = self
            .emergency_repo
            .create(&EmergencyRequest::new(patient_id, pickup_location))
            .await?;
        info!(
            "登记急救请求 {}: 患者 {}, 位置 ({}, {})",
            request.id, patient_id, pickup_location.lat, pickup_location.lng
        );
        Ok(request)
    }

    /// 司机接单并计算路线，重复接单会整体替换之前的路线
    pub async fn accept_emergency(
        &self,
        emergency_id: i64,
        request: EmergencyAcceptRequest,
    ) -> TriageResult<EmergencyDispatch> {
        let mut emergency = self
            .emergency_repo
            .find_by_id(emergency_id)
            .await?
            .ok_or(TriageError::EmergencyNotFound { id: emergency_id })?;

        if emergency.status == EmergencyStatus::Completed {
            return Err(TriageError::invalid_input(format!(
                "急救请求 {emergency_id} 已完成，不能再接单"
            )));
        }

        let driver = request.driver_location.unwrap_or_else(|| {
            warn!(
                "司机 {} 未提供位置，使用默认位置 ({}, {})",
                request.driver_id, self.default_location.lat, self.default_location.lng
            );
            self.default_location
        });
        let pickup = request.pickup_location.unwrap_or(emergency.pickup_location);
        let hospital = request
            .hospital_location
            .or(emergency.hospital_location)
            .unwrap_or_else(|| {
                warn!(
                    "急救请求 {} 未指定医院位置，使用默认位置 ({}, {})",
                    emergency_id, self.default_location.lat, self.default_location.lng
                );
                self.default_location
            });

        let route = self.optimizer.optimal_route(driver, pickup, hospital, None)?;

        emergency.status = EmergencyStatus::Accepted;
        emergency.driver_id = Some(request.driver_id);
        emergency.pickup_location = pickup;
        emergency.hospital_location = Some(hospital);
        emergency.route = Some(route.clone());
        emergency.accepted_at = Some(Utc::now());
        self.emergency_repo.update(&emergency).await?;

        info!(
            "急救请求 {} 已由司机 {} 接单, 路线{}",
            emergency_id,
            request.driver_id,
            if route.is_reachable() { "可用" } else { "不可达" }
        );
        self.publish(DispatchEvent::RouteComputed { emergency_id }).await;

        Ok(EmergencyDispatch {
            emergency_id,
            to_patient: self.summarize(&route.to_patient),
            to_hospital: self.summarize(&route.to_hospital),
            route_available: route.is_reachable(),
            route,
        })
    }

    /// 临时路线预览，不持久化也不发布事件
    pub fn calculate_route(&self, request: RouteRequest) -> TriageResult<Route> {
        self.optimizer.optimal_route(
            request.driver_location,
            request.pickup_location,
            request.hospital_location,
            request.waypoints,
        )
    }

    pub fn update_traffic(&self, waypoint_id: &str, safety_factor: f64) -> TriageResult<()> {
        self.road_conditions
            .update_condition(waypoint_id, safety_factor)?;
        info!("途经点 {} 的安全系数更新为 {}", waypoint_id, safety_factor);
        Ok(())
    }

    pub fn waypoints(&self) -> Vec<GeoNode> {
        self.road_conditions.snapshot()
    }

    fn summarize(&self, leg: &PathResult) -> LegSummary {
        if leg.is_reachable() {
            LegSummary {
                distance_km: leg.distance_km,
                estimated_time_minutes: self.optimizer.estimate_minutes(leg.distance_km),
                reachable: true,
            }
        } else {
            LegSummary {
                distance_km: leg.distance_km,
                estimated_time_minutes: -1,
                reachable: false,
            }
        }
    }

    async fn publish(&self, event: DispatchEvent) {
        if let Err(e) = self.broadcaster.publish(event.clone()).await {
            warn!(
                "发布 {} 事件失败 (对象 {}): {}",
                event.event_type(),
                event.aggregate_id(),
                e
            );
        }
    }
}
