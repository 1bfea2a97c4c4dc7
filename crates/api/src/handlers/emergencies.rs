use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use triage_core::models::GeoPoint;
use triage_dispatcher::EmergencyAcceptRequest;

use crate::{
    error::ApiResult,
    response::{created, success, success_with_message},
    routes::AppState,
};

pub const ROUTE_UNAVAILABLE_MESSAGE: &str = "route unavailable, dispatch via default path";

/// 急救请求登记
#[derive(Debug, Deserialize)]
pub struct CreateEmergencyRequest {
    pub patient_id: i64,
    pub pickup_location: GeoPoint,
}

pub async fn create_emergency(
    State(state): State<AppState>,
    Json(request): Json<CreateEmergencyRequest>,
) -> ApiResult<impl IntoResponse> {
    let emergency = state
        .dispatch_service
        .create_emergency(request.patient_id, request.pickup_location)
        .await?;
    Ok(created(emergency))
}

/// 司机接单，路线不可达时仍返回 200 并附带提示
pub async fn accept_emergency(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<EmergencyAcceptRequest>,
) -> ApiResult<axum::response::Response> {
    let dispatch = state.dispatch_service.accept_emergency(id, request).await?;
    let response = if dispatch.route_available {
        success(dispatch).into_response()
    } else {
        success_with_message(dispatch, ROUTE_UNAVAILABLE_MESSAGE).into_response()
    };
    Ok(response)
}
