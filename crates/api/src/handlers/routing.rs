use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use triage_dispatcher::RouteRequest;

use crate::{
    error::ApiResult,
    handlers::emergencies::ROUTE_UNAVAILABLE_MESSAGE,
    response::{accepted, success, success_with_message},
    routes::AppState,
};

/// 路况更新请求
#[derive(Debug, Deserialize)]
pub struct TrafficUpdateRequest {
    pub waypoint_id: String,
    pub safety_factor: f64,
}

/// 临时路线计算，不落库
pub async fn calculate_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> ApiResult<axum::response::Response> {
    let route = state.dispatch_service.calculate_route(request)?;
    let response = if route.is_reachable() {
        success(route).into_response()
    } else {
        success_with_message(route, ROUTE_UNAVAILABLE_MESSAGE).into_response()
    };
    Ok(response)
}

/// 当前途经点及安全系数
pub async fn list_waypoints(State(state): State<AppState>) -> impl IntoResponse {
    success(state.dispatch_service.waypoints())
}

pub async fn update_traffic(
    State(state): State<AppState>,
    Json(request): Json<TrafficUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .dispatch_service
        .update_traffic(&request.waypoint_id, request.safety_factor)?;
    Ok(accepted(format!(
        "途经点 {} 的路况已更新",
        request.waypoint_id
    )))
}
