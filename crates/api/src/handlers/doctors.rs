use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::{success, success_with_message},
    routes::AppState,
};

/// 队列查询参数，缺省为当天
#[derive(Debug, Deserialize)]
pub struct QueueQueryParams {
    pub date: Option<NaiveDate>,
}

/// 出诊状态切换请求
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// 获取医生的等待队列
pub async fn get_doctor_queue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<QueueQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.queue_service.doctor_queue(id, params.date).await?;
    Ok(success(rows))
}

/// 切换出诊状态，停诊时自动转移等待患者
pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AvailabilityRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .queue_service
        .set_availability(id, request.is_available)
        .await?;
    Ok(success(outcome))
}

/// 叫下一位患者
pub async fn call_next(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<QueueQueryParams>,
) -> ApiResult<axum::response::Response> {
    let response = match state.queue_service.call_next(id, params.date).await? {
        Some(entry) => success(entry).into_response(),
        None => success_with_message(Option::<()>::None, "队列中没有等待的患者").into_response(),
    };
    Ok(response)
}
