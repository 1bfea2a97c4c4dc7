use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use triage_core::models::{
    GeoNode, GeoPoint, PathResult, Route, DRIVER_NODE_ID, HOSPITAL_NODE_ID, PATIENT_NODE_ID,
    UNREACHABLE_DISTANCE,
};
use triage_core::{RoutingConfig, TriageResult};
use triage_domain::RoadConditionsStore;

use crate::road_graph::RoadGraph;
use crate::shortest_path::ShortestPathEngine;

/// 救护车调度路线规划
///
/// 以司机、患者、医院三个角色节点加途经点构建一张路网，分别计算
/// 司机→患者与患者→医院两段最短路径。未显式传入途经点时使用路况存储中的当前快照。
pub struct RouteOptimizer {
    road_conditions: Arc<dyn RoadConditionsStore>,
    max_connection_radius_km: f64,
    average_speed_kmh: f64,
}

impl RouteOptimizer {
    pub fn new(road_conditions: Arc<dyn RoadConditionsStore>, config: &RoutingConfig) -> Self {
        Self {
            road_conditions,
            max_connection_radius_km: config.max_connection_radius_km,
            average_speed_kmh: config.average_speed_kmh,
        }
    }

    pub fn optimal_route(
        &self,
        driver: GeoPoint,
        patient: GeoPoint,
        hospital: GeoPoint,
        waypoints: Option<Vec<GeoNode>>,
    ) -> TriageResult<Route> {
        let waypoints = match waypoints {
            Some(waypoints) => waypoints,
            None => {
                debug!("未指定途经点，使用当前路况快照");
                self.road_conditions.snapshot()
            }
        };

        let mut nodes = Vec::with_capacity(waypoints.len() + 3);
        nodes.push(GeoNode::neutral(DRIVER_NODE_ID, driver)?);
        nodes.push(GeoNode::neutral(PATIENT_NODE_ID, patient)?);
        nodes.push(GeoNode::neutral(HOSPITAL_NODE_ID, hospital)?);
        nodes.extend(waypoints);

        let graph = RoadGraph::build(&nodes, self.max_connection_radius_km)?;
        let to_patient = ShortestPathEngine::shortest_path(&graph, DRIVER_NODE_ID, PATIENT_NODE_ID)?;
        let to_hospital =
            ShortestPathEngine::shortest_path(&graph, PATIENT_NODE_ID, HOSPITAL_NODE_ID)?;

        let route = self.assemble(to_patient, to_hospital);
        if route.is_reachable() {
            info!(
                "路线规划完成: 总距离 {:.2} km, 预计 {} 分钟",
                route.total_distance_km, route.estimated_time_minutes
            );
        } else {
            warn!(
                "路线不可达: 司机→患者 {:.2} km, 患者→医院 {:.2} km",
                route.to_patient.distance_km, route.to_hospital.distance_km
            );
        }

        Ok(route)
    }

    fn assemble(&self, to_patient: PathResult, to_hospital: PathResult) -> Route {
        let (total_distance_km, estimated_time_minutes) =
            if to_patient.is_reachable() && to_hospital.is_reachable() {
                let total = to_patient.distance_km + to_hospital.distance_km;
                (total, self.estimate_minutes(total))
            } else {
                (UNREACHABLE_DISTANCE, -1)
            };

        Route {
            to_patient,
            to_hospital,
            total_distance_km,
            estimated_time_minutes,
            computed_at: Utc::now(),
        }
    }

    /// 按平均车速估算分钟数，向上取整
    pub fn estimate_minutes(&self, distance_km: f64) -> i64 {
        (distance_km / self.average_speed_kmh * 60.0).ceil() as i64
    }
}
