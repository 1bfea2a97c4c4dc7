use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use triage_core::TriageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("调度错误: {0}")]
    Triage(#[from] TriageError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, String, &'static str, Vec<String>) {
        match self {
            ApiError::Triage(TriageError::DoctorNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("医生 ID {id} 不存在"),
                "DOCTOR_NOT_FOUND",
                vec!["请检查医生ID是否正确".to_string()],
            ),
            ApiError::Triage(TriageError::QueueEntryNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("队列记录 ID {id} 不存在"),
                "QUEUE_ENTRY_NOT_FOUND",
                vec![
                    "请检查队列记录ID是否正确".to_string(),
                    "使用 GET /api/doctors/{id}/queue 查看当前队列".to_string(),
                ],
            ),
            ApiError::Triage(TriageError::AppointmentNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("预约 ID {id} 不存在"),
                "APPOINTMENT_NOT_FOUND",
                vec!["请检查预约ID是否正确".to_string()],
            ),
            ApiError::Triage(TriageError::EmergencyNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("急救请求 ID {id} 不存在"),
                "EMERGENCY_NOT_FOUND",
                vec!["请先通过 POST /api/emergencies 登记急救请求".to_string()],
            ),
            ApiError::Triage(TriageError::InvalidInput(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数无效: {msg}"),
                "INVALID_INPUT",
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Triage(TriageError::UnknownNode { id }) => (
                StatusCode::BAD_REQUEST,
                format!("路网中不存在节点 '{id}'"),
                "UNKNOWN_NODE",
                vec!["起点和终点必须是路网中的节点".to_string()],
            ),
            ApiError::Triage(TriageError::UnknownWaypoint { id }) => (
                StatusCode::BAD_REQUEST,
                format!("途经点 '{id}' 不存在"),
                "UNKNOWN_WAYPOINT",
                vec!["使用 GET /api/routes/waypoints 查看可用途经点".to_string()],
            ),
            ApiError::Triage(TriageError::InvalidTransition { from, to }) => (
                StatusCode::CONFLICT,
                format!("队列状态不能从 {from:?} 变为 {to:?}"),
                "INVALID_TRANSITION",
                vec!["请刷新队列状态后重试".to_string()],
            ),
            ApiError::Triage(TriageError::DuplicateQueueEntry { appointment_id }) => (
                StatusCode::CONFLICT,
                format!("预约 {appointment_id} 已在队列中"),
                "DUPLICATE_QUEUE_ENTRY",
                vec!["每个预约只能入队一次".to_string()],
            ),
            ApiError::Triage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST",
                vec![
                    "请检查请求格式和参数".to_string(),
                    "确保Content-Type正确设置".to_string(),
                ],
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND",
                vec!["请检查请求URL是否正确".to_string()],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![format!("错误详情: {msg}")],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = self.parts();
        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
