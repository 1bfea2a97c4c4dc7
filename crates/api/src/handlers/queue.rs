use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use triage_dispatcher::BookingRequest;

use crate::{
    error::ApiResult,
    response::{created, success},
    routes::AppState,
};

/// 挂号入队
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<impl IntoResponse> {
    let confirmation = state.queue_service.book(request).await?;
    Ok(created(confirmation))
}

/// 叫号
pub async fn call_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.queue_service.call(id).await?))
}

/// 就诊完成
pub async fn complete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.queue_service.complete(id).await?))
}

/// 叫号未到，跳过
pub async fn skip_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.queue_service.skip(id).await?))
}

/// 患者放弃就诊
pub async fn decline_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.queue_service.decline(id).await?))
}

/// 过号或被跳过后重新签到
pub async fn check_in_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(state.queue_service.check_in(id).await?))
}
